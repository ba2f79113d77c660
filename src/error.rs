//! Error types for the finance assistant

use thiserror::Error;

/// Result type alias for handler and provider operations
pub type Result<T> = std::result::Result<T, FinBotError>;

#[derive(Error, Debug)]
pub enum FinBotError {

    // =============================
    // Handler Errors
    // =============================

    /// Domain matched but the backing data produced nothing usable.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// An outbound provider call failed.
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Unexpected provider response shape: {0}")]
    ResponseShape(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
