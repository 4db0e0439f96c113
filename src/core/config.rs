use crate::core::errors::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub log_level: Level,
    /// Transport-level cap on request bodies
    pub max_body_bytes: usize,
}

/// External OCR engine configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub binary: String,
    pub language: String,
    /// Tesseract `--oem` (1 = LSTM only)
    pub engine_mode: u8,
    /// Tesseract `--psm` (6 = uniform block of text)
    pub page_seg_mode: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            engine_mode: 1,
            page_seg_mode: 6,
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub temp_dir: PathBuf,
    pub public_dir: PathBuf,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn new() -> ConfigResult<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build and validate a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::load(lookup);
        config.validate()?;
        Ok(config)
    }

    fn load<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("LOG_LEVEL")
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        let defaults = OcrConfig::default();

        Self {
            server: ServerConfig {
                port: lookup("PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                log_level,
                max_body_bytes: lookup("MAX_BODY_BYTES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50 * 1024 * 1024),
            },
            ocr: OcrConfig {
                binary: lookup("TESSERACT_BINARY")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(defaults.binary),
                language: lookup("OCR_LANGUAGE")
                    .map(|s| s.trim().to_string())
                    .unwrap_or(defaults.language),
                engine_mode: lookup("OCR_ENGINE_MODE")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.engine_mode),
                page_seg_mode: lookup("OCR_PAGE_SEG_MODE")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.page_seg_mode),
            },
            storage: StorageConfig {
                temp_dir: lookup("OCR_TEMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(env::temp_dir),
                public_dir: lookup("PUBLIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("public")),
            },
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::InvalidBodyLimit);
        }

        if self.ocr.engine_mode > 3 {
            return Err(ConfigError::InvalidEngineMode(self.ocr.engine_mode));
        }

        if self.ocr.page_seg_mode > 13 {
            return Err(ConfigError::InvalidPageSegMode(self.ocr.page_seg_mode));
        }

        if self.ocr.language.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }

        if !self.storage.temp_dir.is_dir() {
            return Err(ConfigError::InvalidTempDir(
                self.storage.temp_dir.display().to_string(),
            ));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn max_body_bytes(&self) -> usize {
        self.server.max_body_bytes
    }

    pub fn temp_dir(&self) -> &Path {
        &self.storage.temp_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.storage.public_dir
    }
}
