pub mod confidence;
pub mod ocr;

// Re-export commonly used services
pub use confidence::calculate_confidence;
pub use ocr::{OcrEngine, OcrService, TesseractCli};
