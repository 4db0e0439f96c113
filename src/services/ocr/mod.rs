// OCR Service Module - handwriting recognition through an external engine
//
// The engine is an opaque file-in/text-out collaborator. Every request gets
// its own temp file, removed on all exit paths when the handle drops.

pub mod tesseract;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::errors::{RecognitionError, RecognitionResult};

pub use tesseract::TesseractCli;

/// Anything that can turn an image file into text
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine identifier for logs and `/health`
    fn name(&self) -> &'static str;

    /// Recognize the image at `path`, returning raw (untrimmed) text
    async fn recognize_file(&self, path: &Path) -> RecognitionResult<String>;
}

/// Adapter between decoded request payloads and an [`OcrEngine`]
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    temp_dir: PathBuf,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            temp_dir: temp_dir.into(),
        }
    }

    /// Tesseract CLI service configured from the application config
    pub fn from_config(config: &Config) -> Self {
        let engine = TesseractCli::new(config.ocr.clone());
        info!(
            "OCR engine: {} (lang={}, oem={}, psm={}), temp dir: {}",
            config.ocr.binary,
            config.ocr.language,
            config.ocr.engine_mode,
            config.ocr.page_seg_mode,
            config.temp_dir().display()
        );
        Self::new(Arc::new(engine), config.temp_dir())
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Decode a base64 / data-URI payload and recognize it
    pub async fn recognize_payload(&self, image_data: &str) -> RecognitionResult<String> {
        let bytes = decode_image_payload(image_data)?;
        self.recognize_bytes(bytes).await
    }

    /// Recognize raw image bytes, returning trimmed text
    pub async fn recognize_bytes(&self, bytes: Vec<u8>) -> RecognitionResult<String> {
        if bytes.is_empty() {
            return Err(RecognitionError::EmptyPayload);
        }

        let request_id = Uuid::new_v4();
        let byte_count = bytes.len();
        let temp_file = write_temp_image(self.temp_dir.clone(), request_id, bytes).await?;

        debug!(
            "[{}] wrote {} bytes to {}",
            request_id,
            byte_count,
            temp_file.path().display()
        );

        let start = Instant::now();
        // An engine error drops `temp_file`, which removes it
        let raw = self.engine.recognize_file(temp_file.path()).await?;

        // Explicit close so a failed delete is reported
        temp_file.close()?;

        let text = raw.trim().to_string();
        debug!(
            "[{}] {} returned {} chars in {:.0}ms",
            request_id,
            self.engine.name(),
            text.chars().count(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(text)
    }
}

/// Strip an optional `data:<mime>;base64,` header and decode the rest
pub fn decode_image_payload(image_data: &str) -> RecognitionResult<Vec<u8>> {
    let payload = strip_data_uri(image_data.trim());
    let bytes = general_purpose::STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(RecognitionError::EmptyPayload);
    }
    Ok(bytes)
}

fn strip_data_uri(image_data: &str) -> &str {
    match image_data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => image_data,
    }
}

async fn write_temp_image(
    temp_dir: PathBuf,
    request_id: Uuid,
    bytes: Vec<u8>,
) -> RecognitionResult<NamedTempFile> {
    tokio::task::spawn_blocking(move || -> RecognitionResult<NamedTempFile> {
        let prefix = format!("handwriting-{}-", request_id);
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".png")
            .tempfile_in(&temp_dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| RecognitionError::TaskJoinFailed(e.to_string()))?
}
