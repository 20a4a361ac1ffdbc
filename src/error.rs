//! Error taxonomy shared by every generation stage

use thiserror::Error;

/// Error surfaced to the caller of any generation entry point.
///
/// Every variant renders as a single human-readable sentence; the CLI prints
/// it verbatim and never exposes a backtrace.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    /// Unknown item id, missing texture, missing tag or unresolvable skin
    #[error("{0}")]
    NotFound(String),
    /// Malformed metadata or a missing/out-of-range field
    #[error("{0}")]
    InvalidInput(String),
    /// The bounded worker exceeded its time budget
    #[error("Image generation timed out")]
    Timeout,
    /// The build was cancelled or its worker disappeared
    #[error("Image generation was interrupted")]
    Interrupted,
    /// Unexpected raster, encoding or I/O failure
    #[error("{context}: {message}")]
    Internal { context: String, message: String },
}

impl GeneratorError {
    pub fn not_found(message: impl Into<String>) -> Self {
        GeneratorError::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        GeneratorError::InvalidInput(message.into())
    }

    pub fn internal(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        GeneratorError::Internal { context: context.into(), message: message.to_string() }
    }
}

impl From<image::ImageError> for GeneratorError {
    fn from(e: image::ImageError) -> Self {
        GeneratorError::internal("Image error", e)
    }
}

impl From<std::io::Error> for GeneratorError {
    fn from(e: std::io::Error) -> Self {
        GeneratorError::internal("IO error", e)
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        GeneratorError::InvalidInput(format!("Malformed JSON: {}", e))
    }
}

impl From<crate::color::ColorError> for GeneratorError {
    fn from(e: crate::color::ColorError) -> Self {
        GeneratorError::InvalidInput(format!("Invalid color: {}", e))
    }
}

impl From<crate::config::ConfigError> for GeneratorError {
    fn from(e: crate::config::ConfigError) -> Self {
        GeneratorError::InvalidInput(e.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GeneratorError>;
