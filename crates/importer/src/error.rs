use thiserror::Error;

use crate::fetch::FetchError;
use crate::validate::Rejection;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Fetch failed: {0}")]
    FetchError(#[from] FetchError),

    #[error("Record rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Fetch task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Import error: {0}")]
    ImportError(String),
}
