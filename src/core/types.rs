// Wire types and shared state for the recognition server

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::config::Config;
use crate::services::ocr::OcrService;
use crate::utils::Metrics;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ocr: Arc<OcrService>,
    pub metrics: Metrics,
}

/// Body of `POST /api/recognize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeRequest {
    /// Base64 PNG, optionally prefixed with a `data:` URI header
    #[serde(rename = "imageData", default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

/// Successful recognition response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub text: String,
    /// Heuristic score in [0, 1], see `services::confidence`
    pub confidence: f64,
}

/// Error payload shared by 4xx and 5xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
