use anyhow::Context;
use clap::Parser;
use scribble_game::Registry;
use scribble_server::{Api, AppState, Config, ValidatedConfig};
use scribble_store::{Backend, DynamoDb, Memory, Records};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on, overriding the configuration file.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep player records in process memory instead of DynamoDB.
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config file {}", path.display()))?;
            serde_yaml::from_str::<Config>(&raw).context("could not parse config file")?
        }
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    let config = config.validate().context("invalid configuration")?;

    // Create logger
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(config.log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(config.log_level)
            .init();
    }

    // Connect to the record store
    if args.memory_store {
        warn!("Using in-memory player records, they are lost on exit");
        serve(config, Records::new(Memory::new())).await
    } else {
        let backend = DynamoDb::from_env(config.table_name.clone()).await;
        info!(table = backend.table(), "Using player record table");
        serve(config, Records::new(backend)).await
    }
}

async fn serve<B: Backend>(config: ValidatedConfig, records: Records<B>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(Arc::new(Registry::new()), records));
    let app = Api::new(state)
        .with_rate_limit(config.rate_limit)
        .with_allowed_origins(config.allowed_origins)
        .with_trust_proxy_headers(config.trust_proxy_headers)
        .router();

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("axum server error")?;

    Ok(())
}
