//! Error types for the index.

use thiserror::Error;

/// Main error type for index construction.
///
/// Lookups and mutations never fail; absence is reported as `None` or an
/// empty collection.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
