//! Error types for the webform builder

use thiserror::Error;

/// Core error type for webform builder operations
#[derive(Error, Debug)]
pub enum WebformError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("No dataset selected")]
    NoDatasetSelected,

    #[error("Invalid schema payload: {0}")]
    InvalidSchema(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for webform builder operations
pub type Result<T> = std::result::Result<T, WebformError>;
