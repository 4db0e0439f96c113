use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageResult, RgbaImage};
use std::io::Cursor;

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut png_bytes = Vec::new();
    let mut cursor = Cursor::new(&mut png_bytes);
    img.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(png_bytes)
}

/// Resample `img` to exactly `width` x `height`.
pub fn resample(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Triangle)
}

/// Asynchronously load an image from bytes using spawn_blocking.
///
/// Image decoding is CPU-intensive, especially for large images.
pub async fn load_image_from_memory_async(bytes: &[u8]) -> Result<DynamicImage> {
    let bytes = bytes.to_vec(); // Clone to move into blocking task
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).context("Failed to load image from memory")
    })
    .await
    .context("Failed to spawn blocking task for image loading")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let img = RgbaImage::from_pixel(40, 30, Rgba([255, 255, 255, 255]));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn test_resample_keeps_uniform_color() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let out = resample(&img, 25, 7);
        assert_eq!(out.dimensions(), (25, 7));
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[tokio::test]
    async fn test_load_image_async() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let png = encode_png(&img).unwrap();

        let loaded = load_image_from_memory_async(&png).await.unwrap();
        assert_eq!(loaded.width(), 1);
        assert!(load_image_from_memory_async(b"nope").await.is_err());
    }
}
