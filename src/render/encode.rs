use std::io::Cursor;

use image::ImageEncoder as _;

use crate::foundation::error::{KeepsakeError, KeepsakeResult};
use crate::render::cpu::PageRgba;

/// Flatten premultiplied RGBA onto white and drop alpha.
///
/// Pages are painted on an opaque background, so for real pages this is a plain channel copy.
fn flatten_rgb8(frame: &PageRgba) -> KeepsakeResult<Vec<u8>> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(KeepsakeError::encoding(format!(
            "frame is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    let mut rgb = Vec::with_capacity(expected / 4 * 3);
    for px in frame.data.chunks_exact(4) {
        let under = 255 - px[3];
        rgb.extend([
            px[0].saturating_add(under),
            px[1].saturating_add(under),
            px[2].saturating_add(under),
        ]);
    }
    Ok(rgb)
}

/// Baseline JPEG at `quality` (1..=100).
pub fn encode_jpeg(frame: &PageRgba, quality: u8) -> KeepsakeResult<Vec<u8>> {
    let rgb = flatten_rgb8(frame)?;
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| KeepsakeError::encoding(format!("jpeg: {e}")))?;
    Ok(out)
}

/// Lossless PNG, used for single-page previews.
pub fn encode_png(frame: &PageRgba) -> KeepsakeResult<Vec<u8>> {
    let rgb = flatten_rgb8(frame)?;
    let mut out = Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| KeepsakeError::encoding(format!("png: {e}")))?;
    Ok(out.into_inner())
}
