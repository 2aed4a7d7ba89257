use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// Parsed brand-mark SVG shared by every rasterizer of a run.
#[derive(Clone, Debug)]
pub struct BrandMark {
    tree: Arc<usvg::Tree>,
}

impl BrandMark {
    pub fn load(path: &Path) -> KeepsakeResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read brand svg '{}'", path.display()))
            .map_err(|e| KeepsakeError::environment(format!("{e:#}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> KeepsakeResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| KeepsakeError::environment(format!("parse brand svg: {e}")))?;
        Ok(Self {
            tree: Arc::new(tree),
        })
    }

    /// Intrinsic `(width, height)` of the SVG in user units.
    pub fn size(&self) -> (f32, f32) {
        let s = self.tree.size();
        (s.width(), s.height())
    }

    /// Largest `(width, height)` with the SVG's aspect ratio that fits inside `max_w`x`max_h`.
    pub fn fit_within(&self, max_w: u32, max_h: u32) -> (u32, u32) {
        let (w, h) = self.size();
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return (max_w.max(1), max_h.max(1));
        }
        let scale = (max_w as f32 / w).min(max_h as f32 / h);
        (
            ((w * scale).round() as u32).max(1),
            ((h * scale).round() as u32).max(1),
        )
    }

    /// Rasterize into a premultiplied RGBA8 buffer of exactly `width`x`height`.
    pub fn rasterize_premul_rgba8(&self, width: u32, height: u32) -> KeepsakeResult<Vec<u8>> {
        const MAX_DIM: u32 = 16_384;
        if width > MAX_DIM || height > MAX_DIM {
            return Err(KeepsakeError::environment(format!(
                "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| KeepsakeError::environment("failed to allocate svg pixmap"))?;

        let sx = (width as f32) / self.tree.size().width();
        let sy = (height as f32) / self.tree.size().height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

        resvg::render(&self.tree, xform, &mut pixmap.as_mut());
        Ok(pixmap.data().to_vec())
    }
}
