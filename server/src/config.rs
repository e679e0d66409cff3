use axum::http::HeaderValue;
use scribble_store::DEFAULT_TABLE_NAME;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Per-IP request quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimit {
    /// Milliseconds after which one request of the quota is replenished.
    pub period_ms: u64,
    pub burst_size: u32,
}

/// Server configuration as read from a YAML file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimit>,
    /// Origins allowed to make credentialed cross-origin requests. Empty
    /// allows any origin without credentials.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Attribute requests to `X-Forwarded-For` / `X-Real-IP` instead of the
    /// peer address. Only safe behind a proxy that overwrites them.
    #[serde(default = "default_trust_proxy_headers")]
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("table_name must not be empty")]
    EmptyTableName,
    #[error("invalid allowed origin: {value}")]
    InvalidOrigin { value: String },
}

pub struct ValidatedConfig {
    pub port: u16,
    pub log_level: Level,
    pub json_logs: bool,
    pub table_name: String,
    pub rate_limit: Option<RateLimit>,
    pub allowed_origins: Vec<HeaderValue>,
    pub trust_proxy_headers: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_rate_limit() -> Option<RateLimit> {
    Some(RateLimit {
        period_ms: 100,
        burst_size: 50,
    })
}

fn default_trust_proxy_headers() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            json_logs: false,
            table_name: default_table_name(),
            rate_limit: default_rate_limit(),
            allowed_origins: Vec::new(),
            trust_proxy_headers: default_trust_proxy_headers(),
        }
    }
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        if self.table_name.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }

        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.period_ms == 0 {
                return Err(ConfigError::InvalidNonZero {
                    field: "rate_limit.period_ms",
                    value: rate_limit.period_ms,
                });
            }
            if rate_limit.burst_size == 0 {
                return Err(ConfigError::InvalidNonZero {
                    field: "rate_limit.burst_size",
                    value: rate_limit.burst_size.into(),
                });
            }
        }

        let allowed_origins = self
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin {
                    value: origin.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedConfig {
            port: self.port,
            log_level,
            json_logs: self.json_logs,
            table_name: self.table_name,
            rate_limit: self.rate_limit,
            allowed_origins,
            trust_proxy_headers: self.trust_proxy_headers,
        })
    }
}
