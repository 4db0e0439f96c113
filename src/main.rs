// Main entry point for the handwriting recognition server

use handwriting_pad::{router, AppState, Config, Metrics, OcrService};

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new()?);

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "handwriting_pad={},tower_http=warn",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== HANDWRITING RECOGNITION PAD ===");

    let ocr = Arc::new(OcrService::from_config(&config));

    if !config.public_dir().is_dir() {
        warn!(
            "Public directory {} not found, the drawing page will not be served",
            config.public_dir().display()
        );
    }

    let state = AppState {
        config: config.clone(),
        ocr,
        metrics: Metrics::new(),
    };

    let app = router(state);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("{}", "=".repeat(70));
    info!("Handwriting recognition server running on port {}", config.server_port());
    info!("Open http://localhost:{} in your browser", config.server_port());
    info!("{}", "-".repeat(70));
    info!("Endpoints:");
    info!("  GET  /                - Drawing pad (static files)");
    info!("  POST /api/recognize   - Recognize handwriting (JSON imageData)");
    info!("  GET  /health          - Health check");
    info!("  GET  /metrics         - Prometheus metrics");
    info!("  GET  /stats           - Detailed statistics");
    info!("{}", "=".repeat(70));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
