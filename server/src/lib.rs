use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Form, Query, State as AxumState,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use scribble_game::Registry;
use scribble_store::{Backend, Records};
use scribble_types::LobbyData;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
    GovernorLayer,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod admission;
pub mod config;
pub mod error;
pub mod form;
pub mod identity;

pub use admission::{Admission, Admitted};
pub use config::{Config, ConfigError, RateLimit, ValidatedConfig};
pub use error::ApiError;
pub use form::{LobbyForm, LobbyRequest};
pub use identity::{Origin, TrustProxyHeaders};

/// Everything the handlers share.
pub struct AppState<B: Backend> {
    pub admission: Admission,
    pub records: Records<B>,
}

impl<B: Backend> AppState<B> {
    pub fn new(registry: Arc<Registry>, records: Records<B>) -> Self {
        Self {
            admission: Admission::new(registry),
            records,
        }
    }
}

pub struct Api<B: Backend> {
    state: Arc<AppState<B>>,
    rate_limit: Option<RateLimit>,
    allowed_origins: Vec<HeaderValue>,
    trust_proxy_headers: bool,
}

impl<B: Backend> Api<B> {
    pub fn new(state: Arc<AppState<B>>) -> Self {
        Self {
            state,
            rate_limit: None,
            allowed_origins: Vec::new(),
            trust_proxy_headers: true,
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimit>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_allowed_origins(mut self, allowed_origins: Vec<HeaderValue>) -> Self {
        self.allowed_origins = allowed_origins;
        self
    }

    /// Whether origins and rate limit keys come from proxy headers or the
    /// peer address.
    pub fn with_trust_proxy_headers(mut self, trust_proxy_headers: bool) -> Self {
        self.trust_proxy_headers = trust_proxy_headers;
        self
    }

    pub fn router(&self) -> Router {
        // Configure CORS
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
        let cors = if self.allowed_origins.is_empty() {
            cors.allow_origin(Any)
        } else {
            cors.allow_origin(AllowOrigin::list(self.allowed_origins.clone()))
                .allow_credentials(true)
        };

        let router = Router::new()
            .route("/health", get(health))
            .route("/v1/lobby", post(create_lobby::<B>))
            .route(
                "/v1/lobby/player",
                get(enter_lobby::<B>).patch(enter_lobby::<B>),
            )
            .route("/v1/highscores", get(high_scores::<B>))
            .layer(Extension(TrustProxyHeaders(self.trust_proxy_headers)))
            .layer(cors)
            .with_state(self.state.clone());

        // Configure Rate Limiting
        let Some(rate_limit) = self.rate_limit else {
            return router;
        };
        let limited = if self.trust_proxy_headers {
            GovernorConfigBuilder::default()
                .per_millisecond(rate_limit.period_ms)
                .burst_size(rate_limit.burst_size)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .map(|config| {
                    router.clone().layer(GovernorLayer {
                        config: Arc::new(config),
                    })
                })
        } else {
            GovernorConfigBuilder::default()
                .per_millisecond(rate_limit.period_ms)
                .burst_size(rate_limit.burst_size)
                .key_extractor(PeerIpKeyExtractor)
                .finish()
                .map(|config| {
                    router.clone().layer(GovernorLayer {
                        config: Arc::new(config),
                    })
                })
        };
        limited.unwrap_or_else(|| {
            tracing::warn!("Invalid rate limit {:?}, serving without one", rate_limit);
            router
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct EnterQuery {
    lobby_id: Option<String>,
    username: Option<String>,
}

fn admitted_response(jar: CookieJar, admitted: Admitted<Vec<u8>>) -> Response {
    let jar = match admitted.session {
        Some(session) => jar.add(identity::session_cookie(session)),
        None => jar,
    };
    (
        StatusCode::OK,
        jar,
        [(header::CONTENT_TYPE, "application/json")],
        admitted.response,
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn enter_lobby<B: Backend>(
    AxumState(state): AxumState<Arc<AppState<B>>>,
    Origin(origin): Origin,
    jar: CookieJar,
    query: Result<Query<EnterQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = identity::player_name(&jar, query.username.as_deref());
    let admitted = state.admission.enter(
        query.lobby_id.as_deref(),
        identity::session(&jar),
        &origin,
        name,
        |data: &LobbyData| serde_json::to_vec(data),
    )?;
    Ok(admitted_response(jar, admitted))
}

async fn create_lobby<B: Backend>(
    AxumState(state): AxumState<Arc<AppState<B>>>,
    Origin(origin): Origin,
    jar: CookieJar,
    form: Result<Form<LobbyForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = identity::player_name(&jar, Some(&form.username));
    let admitted = state.admission.create(form, name, &origin, |data: &LobbyData| {
        serde_json::to_vec(data)
    })?;
    Ok(admitted_response(jar, admitted))
}

async fn high_scores<B: Backend>(
    AxumState(state): AxumState<Arc<AppState<B>>>,
) -> impl IntoResponse {
    Json(state.records.high_scores().await)
}
