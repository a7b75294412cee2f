//! services/api/src/error.rs
//!
//! Startup errors for the API binary. Request-level failures are mapped to
//! status codes inside the handlers.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Binding the listener or serving connections.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction, CORS origin parsing.
    #[error("Startup failed: {0}")]
    Internal(String),
}
