use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::KeepsakeResult;

/// A decoded photo in straight-alpha RGBA8.
///
/// Cheap to clone; pages running on different workers share the same pixel buffer.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Arc<image::RgbaImage>,
}

/// Decode encoded image bytes (any format the `image` crate recognizes).
///
/// Images whose longest edge exceeds `max_edge` are downscaled, preserving aspect ratio, so one
/// oversized upload cannot blow up memory for the rest of the run.
pub fn decode_image(bytes: &[u8], max_edge: u32) -> KeepsakeResult<DecodedImage> {
    let mut dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    if dyn_img.width().max(dyn_img.height()) > max_edge {
        dyn_img = dyn_img.resize(max_edge, max_edge, image::imageops::FilterType::Triangle);
    }
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        rgba8: Arc::new(rgba),
    })
}

/// Scale-to-fill then center-crop `image` to exactly `width`x`height`.
pub(crate) fn fit_cover(image: &DecodedImage, width: u32, height: u32) -> image::RgbaImage {
    if image.width == width && image.height == height {
        return image.rgba8.as_ref().clone();
    }
    image::DynamicImage::ImageRgba8(image.rgba8.as_ref().clone())
        .resize_to_fill(width, height, image::imageops::FilterType::Lanczos3)
        .into_rgba8()
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
