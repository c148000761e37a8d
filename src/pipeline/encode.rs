//! JPEG encoding of decoded or rendered images.
//!
//! JPEG has no alpha channel, so every image is flattened to RGB8 first.
//! The same encoder feeds both rendered PDF pages and the image XObjects
//! embedded by images-to-PDF (as `DCTDecode` streams).

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Encode an image as baseline JPEG at `quality` (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;

    debug!(
        "Encoded {}x{} image → {} bytes JPEG (q={})",
        rgb.width(),
        rgb.height(),
        buf.len(),
        quality
    );
    Ok(buf)
}
