// Custom error types for the recognition pipeline
//
// thiserror-based enums, one per layer, so handlers can match on the
// failure kind and map it to an HTTP status.

use thiserror::Error;

/// OCR invocation adapter errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Invalid image payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("Image payload is empty")]
    EmptyPayload,

    #[error("Image payload must be a string, got {0}")]
    NonStringPayload(&'static str),

    #[error("Temporary image I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR engine '{binary}' could not be started: {source}")]
    EngineUnavailable {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

/// Drawing surface errors
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("PNG encoding failed: {0}")]
    EncodeFailed(#[from] image::ImageError),
}

/// Recognition client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to recognition endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned an error ({status})")]
    Status { status: u16 },

    #[error("Failed to export drawing: {0}")]
    Export(#[from] SurfaceError),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Port must be > 0")]
    InvalidPort,

    #[error("OCR engine mode must be in [0, 3], got {0}")]
    InvalidEngineMode(u8),

    #[error("Page segmentation mode must be in [0, 13], got {0}")]
    InvalidPageSegMode(u8),

    #[error("OCR language must not be empty")]
    EmptyLanguage,

    #[error("Max body size must be > 0")]
    InvalidBodyLimit,

    #[error("Temp directory does not exist: {0}")]
    InvalidTempDir(String),
}

pub type RecognitionResult<T> = Result<T, RecognitionError>;
pub type ClientResult<T> = Result<T, ClientError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
