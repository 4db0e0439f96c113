use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Form,
};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::core::errors::{RecognitionError, RecognitionResult};
use crate::core::types::{AppState, ErrorResponse, RecognitionResponse, RecognizeRequest};
use crate::services::calculate_confidence;
use crate::services::ocr::decode_image_payload;

/// Failures surfaced by the recognition endpoint
#[derive(Debug)]
pub enum ApiError {
    /// `imageData` missing or blank
    MissingImage,
    /// Body could not be parsed as JSON / form data
    InvalidBody(String),
    /// Decode, temp-file or OCR engine failure
    Processing(RecognitionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingImage => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "No image data provided".to_string(),
                    details: None,
                },
            ),
            ApiError::InvalidBody(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid request body".to_string(),
                    details: Some(details),
                },
            ),
            ApiError::Processing(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Failed to process handwriting".to_string(),
                    details: Some(e.to_string()),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// `imageData` as sent, accepted as JSON or `application/x-www-form-urlencoded`.
/// Kept untyped so JSON `false`/`0` count as missing rather than malformed.
pub struct RecognizePayload(pub Option<Value>);

#[derive(Deserialize)]
struct JsonRecognizeRequest {
    #[serde(rename = "imageData", default)]
    image_data: Option<Value>,
}

/// Pick the image string out of `imageData`.
///
/// `null`, `false`, `0` and blank strings yield `Ok(None)`; any other
/// non-string value is a processing failure.
pub fn image_data_text(value: Option<&Value>) -> RecognitionResult<Option<&str>> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then_some(trimmed))
        }
        Some(Value::Bool(true)) => Err(RecognitionError::NonStringPayload("boolean")),
        Some(Value::Number(_)) => Err(RecognitionError::NonStringPayload("number")),
        Some(Value::Array(_)) => Err(RecognitionError::NonStringPayload("array")),
        Some(Value::Object(_)) => Err(RecognitionError::NonStringPayload("object")),
    }
}

#[async_trait]
impl<S> FromRequest<S> for RecognizePayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(body) = Form::<RecognizeRequest>::from_request(req, state)
                .await
                .map_err(|e| {
                    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        e.into_response()
                    } else {
                        ApiError::InvalidBody(e.body_text()).into_response()
                    }
                })?;
            return Ok(Self(body.image_data.map(Value::String)));
        }

        // Oversized bodies keep the transport's 413
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if bytes.is_empty() {
            return Ok(Self(None));
        }

        serde_json::from_slice::<JsonRecognizeRequest>(&bytes)
            .map(|body| Self(body.image_data))
            .map_err(|e| ApiError::InvalidBody(e.to_string()).into_response())
    }
}

/// Recognize handwriting endpoint
///
/// # Request Format:
/// - JSON `{ "imageData": "<base64 or data-URI PNG>" }` (form-encoded also accepted)
///
/// # Response:
/// - 200 `{ "text", "confidence" }`
/// - 400 when `imageData` is missing or blank
/// - 500 with `details` when decoding or OCR fails
pub async fn recognize_handler(
    State(state): State<AppState>,
    RecognizePayload(image_data): RecognizePayload,
) -> Result<Json<RecognitionResponse>, ApiError> {
    state.metrics.record_endpoint_request("/api/recognize");

    let image_data = match image_data_text(image_data.as_ref()) {
        Ok(Some(data)) => data,
        Ok(None) => {
            warn!("Recognize request without image data");
            state.metrics.record_validation_reject();
            return Err(ApiError::MissingImage);
        }
        Err(e) => {
            error!("Error recognizing handwriting: {}", e);
            state.metrics.record_recognition(Duration::ZERO, 0, None);
            return Err(ApiError::Processing(e));
        }
    };

    let start_time = Instant::now();
    let mut decoded_len = 0;
    let outcome = match decode_image_payload(image_data) {
        Ok(bytes) => {
            decoded_len = bytes.len();
            state.ocr.recognize_bytes(bytes).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(text) => {
            let confidence = calculate_confidence(&text);
            state.metrics.record_recognition(
                start_time.elapsed(),
                decoded_len,
                Some(text.chars().count()),
            );
            info!(
                "Recognized {} chars (confidence {:.2}) in {:.2}s",
                text.chars().count(),
                confidence,
                start_time.elapsed().as_secs_f64()
            );
            Ok(Json(RecognitionResponse { text, confidence }))
        }
        Err(e) => {
            error!("Error recognizing handwriting: {}", e);
            state
                .metrics
                .record_recognition(start_time.elapsed(), decoded_len, None);
            Err(ApiError::Processing(e))
        }
    }
}
