//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 15 MB of base64 attachments plus room for the rest of the form.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Sessions untouched for this long are dropped when a new one is created.
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub allowed_origin: String,
    pub max_body_bytes: usize,
    pub session_idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");

        let max_body_str = var_or("MAX_BODY_BYTES", &DEFAULT_MAX_BODY_BYTES.to_string());
        let max_body_bytes = max_body_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("MAX_BODY_BYTES".to_string(), e.to_string())
        })?;

        // --- Session Registry ---
        let ttl_str = var_or(
            "SESSION_IDLE_TTL_SECS",
            &DEFAULT_SESSION_IDLE_TTL_SECS.to_string(),
        );
        let session_idle_ttl = ttl_str.parse::<u64>().map(Duration::from_secs).map_err(|e| {
            ConfigError::InvalidValue("SESSION_IDLE_TTL_SECS".to_string(), e.to_string())
        })?;

        let max_sessions_str = var_or("MAX_SESSIONS", &DEFAULT_MAX_SESSIONS.to_string());
        let max_sessions = max_sessions_str
            .parse::<usize>()
            .ok()
            .filter(|max| *max > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_SESSIONS".to_string(),
                    format!("'{}' is not a positive number", max_sessions_str),
                )
            })?;

        // --- Generation Service ---
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;
        let gemini_model = var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
        let gemini_api_base = var_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bind_address,
            log_level,
            gemini_api_key,
            gemini_model,
            gemini_api_base,
            allowed_origin,
            max_body_bytes,
            session_idle_ttl,
            max_sessions,
        })
    }
}
