//! Store error types.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Store not configured")]
    NotConfigured,
}

/// A failed best-effort write. Logged by the caller, never returned to a client.
#[derive(Debug, Error)]
#[error("Failed to persist record to '{table}': {source}")]
pub struct PersistenceError {
    pub table: String,
    #[source]
    pub source: StoreError,
}
