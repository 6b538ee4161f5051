//! Custom error types for siteintel

use thiserror::Error;
use uuid::Uuid;

/// Main error type for siteintel operations
///
/// Transient upstream errors (timeouts, 5xx, quota) are retried with bounded
/// backoff before any of these surface to the caller. Each variant maps to a
/// distinct caller-visible category so the API layer can render kind-specific
/// guidance.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Resolution failed: {reason}")]
    Resolution { reason: String },

    #[error("Insight extraction failed: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for siteintel
pub type Result<T> = std::result::Result<T, Error>;
