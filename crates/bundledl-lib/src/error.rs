use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleDlError {
    #[error("Authentication error: {details}")]
    Auth { details: String },

    #[error("Catalog request to {url} failed with status {status}")]
    Fetch { url: String, status: u16 },

    #[error("Validation failed: {details}")]
    Validation { details: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write session cache to {path}: {reason}")]
    SessionCache { path: PathBuf, reason: String },

    #[error("{failed} of {total} downloads failed")]
    TransfersFailed { failed: usize, total: usize },

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl BundleDlError {
    pub fn validation(details: impl Into<String>) -> Self {
        Self::Validation {
            details: details.into(),
        }
    }
}
