pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::Config;
pub use errors::{ClientError, ConfigError, RecognitionError, SurfaceError};
pub use types::{AppState, ErrorResponse, RecognitionResponse, RecognizeRequest};
