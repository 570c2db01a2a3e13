//! # Error Types
//!
//! Custom error types for ISS Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for ISS Bridge
#[derive(Debug, Error)]
pub enum IssBridgeError {
    /// Frame too short, non-hex field or unknown type tag
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors (observation log, cursor file)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame store errors
    #[error("Frame source error: {0}")]
    FrameSource(String),
}

/// Result type alias for ISS Bridge
pub type Result<T> = std::result::Result<T, IssBridgeError>;
