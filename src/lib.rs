// Library exports for the handwriting pad
//
// Server side: recognition endpoint backed by an external OCR engine.
// Client side: headless drawing surface and the orchestrator that ships it.

pub mod api;
pub mod client;
pub mod core;
pub mod services;
pub mod surface;
pub mod utils;

// Re-export commonly used types and functions
pub use crate::core::{
    config::Config,
    errors::{ClientError, ConfigError, RecognitionError, SurfaceError},
    types::{AppState, ErrorResponse, RecognitionResponse, RecognizeRequest},
};

pub use api::router;

pub use client::{PadController, RecognitionClient, RecognizeOutcome, ResultPanel};

pub use services::{calculate_confidence, OcrEngine, OcrService, TesseractCli};

pub use surface::{DrawingSurface, InputEvent, Point};

pub use utils::Metrics;
