use crate::foundation::core::Rgba8;
use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// A blurred rectangle ready to composite, premultiplied RGBA8.
///
/// The sprite is `pad` pixels larger than the casting rectangle on every side.
pub(crate) struct ShadowSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pad: u32,
    pub(crate) rgba8_premul: Vec<u8>,
}

/// Gaussian-blurred `width`x`height` rectangle tinted with `color`.
///
/// A Gaussian blur of an axis-aligned box is separable into the product of two blurred 1-D box
/// profiles, so only the profiles are convolved.
pub(crate) fn shadow_sprite(
    width: u32,
    height: u32,
    sigma: f32,
    color: Rgba8,
) -> KeepsakeResult<ShadowSprite> {
    if width == 0 || height == 0 {
        return Err(KeepsakeError::validation("shadow rect must be non-empty"));
    }
    let radius = (sigma.max(0.0) * 3.0).ceil() as u32;
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let cols = blurred_box_profile(width, radius, &kernel);
    let rows = blurred_box_profile(height, radius, &kernel);
    let sprite_w = width + 2 * radius;
    let sprite_h = height + 2 * radius;

    let len = (sprite_w as usize)
        .checked_mul(sprite_h as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| KeepsakeError::environment("shadow buffer size overflow"))?;
    let tint = color.premultiplied();
    let mut out = Vec::with_capacity(len);
    for &ry in &rows {
        for &cx in &cols {
            let coverage = u32::from(ry) * u32::from(cx);
            for c in tint {
                out.push(((u32::from(c) * coverage + 32_512) / 65_025) as u8);
            }
        }
    }

    Ok(ShadowSprite {
        width: sprite_w,
        height: sprite_h,
        pad: radius,
        rgba8_premul: out,
    })
}

/// 1-D coverage (0..=255) of a `len`-long box after blurring, with `radius` pixels of margin.
fn blurred_box_profile(len: u32, radius: u32, kernel: &[u32]) -> Vec<u8> {
    let n = (len + 2 * radius) as i64;
    let r = radius as i64;
    let inside = |i: i64| -> u64 { u64::from(i >= r && i < r + i64::from(len)) * 255 };

    (0..n)
        .map(|x| {
            let acc: u64 = kernel
                .iter()
                .enumerate()
                .map(|(ki, &kw)| u64::from(kw) * inside(x + ki as i64 - r))
                .sum();
            q16_to_u8(acc)
        })
        .collect()
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> KeepsakeResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(KeepsakeError::validation("shadow blur must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights: Vec<f64> = (-r..=r)
        .map(|i| (-f64::from(i * i) / denom).exp())
        .collect();
    let sum: f64 = weights.iter().sum();

    let mut q: Vec<u32> = weights
        .iter()
        .map(|w| ((w / sum) * 65_536.0).round().clamp(0.0, 65_536.0) as u32)
        .collect();
    // Fold rounding drift into the center tap so the kernel sums to exactly 1.0 in Q16.
    let total: i64 = q.iter().map(|&v| i64::from(v)).sum();
    let mid = q.len() / 2;
    q[mid] = (i64::from(q[mid]) + 65_536 - total).clamp(0, 65_536) as u32;
    Ok(q)
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32_768) >> 16).min(255) as u8
}
