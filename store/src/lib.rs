//! Typed access to the remote table of player records.

mod backend;
#[cfg(feature = "dynamodb")]
mod dynamodb;
mod memory;
mod records;

pub use backend::{Attribute, Backend, Item, Page, KEY_ATTRIBUTE};
#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDb;
pub use memory::Memory;
pub use records::Records;

use thiserror::Error;

/// Table player records live in unless configured otherwise.
pub const DEFAULT_TABLE_NAME: &str = "ScribbleServicePlayers";

/// Error type for store operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("could not find record '{0}'")]
    NotFound(String),
    #[error("malformed record: missing or invalid attribute '{0}'")]
    Malformed(&'static str),
}

impl Error {
    pub fn unavailable(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::StoreUnavailable(err.into())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
