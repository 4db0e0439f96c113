//! Run the OCR adapter and confidence heuristic over an image file.
//! Run with: cargo run --release --bin recognize-image -- <image_path>

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use handwriting_pad::utils::load_image_from_memory_async;
use handwriting_pad::{calculate_confidence, Config, OcrService};

#[derive(Parser, Debug)]
#[command(version, about = "Recognize handwriting in a PNG without starting the server")]
struct Args {
    /// Image to recognize
    image: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("handwriting_pad=debug")
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Config::new()?;

    info!("Loading image: {}", args.image.display());
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Image not found: {}", args.image.display()))?;
    let image = load_image_from_memory_async(&bytes).await?;
    info!("Image dimensions: {}x{}", image.width(), image.height());

    let ocr_service = OcrService::from_config(&config);
    let text = ocr_service.recognize_bytes(bytes).await?;
    let confidence = calculate_confidence(&text);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&handwriting_pad::RecognitionResponse {
                text,
                confidence
            })?
        );
        return Ok(());
    }

    println!("\n=== Results ===");
    println!("Confidence (heuristic): {:.2}", confidence);
    println!("Text:");
    if text.is_empty() {
        println!("  (empty)");
    } else {
        for (i, line) in text.lines().enumerate() {
            println!("  {}. {}", i + 1, line);
        }
    }

    Ok(())
}
