// Error types for nanoglass

use thiserror::Error;

/// Result type for nanoglass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, generating or exporting images
#[derive(Error, Debug)]
pub enum Error {
    /// Neither a prompt nor a reference image was supplied
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid reference image: {0}")]
    InvalidReference(String),

    /// The generation endpoint rejected the request
    #[error("Upstream generation failure: {0}")]
    Upstream(String),

    #[error("Decode error: {0}")]
    Decode(String),

    /// The decoded image could not be turned into an RGBA drawing surface
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl Error {
    /// Post-processing failures that should fall back to the original image
    pub fn is_post_processing(&self) -> bool {
        matches!(
            self,
            Error::Decode(_) | Error::SurfaceUnavailable(_) | Error::Encode(_)
        )
    }
}
