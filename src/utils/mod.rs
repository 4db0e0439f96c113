pub mod image_ops;
pub mod metrics;

// Re-export commonly used items
pub use image_ops::{encode_png, load_image_from_memory_async, resample};
pub use metrics::{Metrics, MetricsSnapshot};
