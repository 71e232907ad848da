//! Error types for Umbra

use thiserror::Error;

/// Result type alias using Umbra's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or loading a render configuration
#[derive(Error, Debug)]
pub enum Error {
    /// A configured value is outside its allowed range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding/decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration file could not be parsed or written
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidParameter`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
