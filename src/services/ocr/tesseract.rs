use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

use super::OcrEngine;
use crate::core::config::OcrConfig;
use crate::core::errors::{RecognitionError, RecognitionResult};

/// Tesseract invoked as a subprocess: `tesseract <image> stdout -l .. --oem .. --psm ..`
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Full argument list for one image (binary excluded)
    pub fn command_args(&self, image_path: &Path) -> Vec<OsString> {
        vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            self.config.language.clone().into(),
            "--oem".into(),
            self.config.engine_mode.to_string().into(),
            "--psm".into(),
            self.config.page_seg_mode.to_string().into(),
        ]
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize_file(&self, path: &Path) -> RecognitionResult<String> {
        debug!("Running {} on {}", self.config.binary, path.display());

        let output = Command::new(&self.config.binary)
            .args(self.command_args(path))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RecognitionError::EngineUnavailable {
                binary: self.config.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} failed ({}): {}", self.config.binary, output.status, stderr);
            return Err(RecognitionError::EngineFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_binary(binary: &str) -> OcrConfig {
        OcrConfig {
            binary: binary.to_string(),
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_command_args_match_engine_settings() {
        let engine = TesseractCli::new(OcrConfig::default());
        let args: Vec<String> = engine
            .command_args(Path::new("/tmp/pad.png"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            ["/tmp/pad.png", "stdout", "-l", "eng", "--oem", "1", "--psm", "6"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let engine = TesseractCli::new(config_with_binary("no-such-ocr-binary-on-path"));
        let err = engine
            .recognize_file(Path::new("/tmp/pad.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::EngineUnavailable { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_engine_failure() {
        let engine = TesseractCli::new(config_with_binary("false"));
        let err = engine
            .recognize_file(Path::new("/tmp/pad.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::EngineFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_returned() {
        // `echo` prints its arguments, standing in for recognized text
        let engine = TesseractCli::new(config_with_binary("echo"));
        let text = engine
            .recognize_file(Path::new("/tmp/pad.png"))
            .await
            .unwrap();
        assert_eq!(text.trim(), "/tmp/pad.png stdout -l eng --oem 1 --psm 6");
    }
}
