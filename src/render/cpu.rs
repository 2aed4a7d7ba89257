use std::sync::Arc;

use crate::assets::decode::{fit_cover, premultiply_rgba8_in_place};
use crate::assets::fonts::{FontSet, ShapedText, TextLayoutEngine};
use crate::assets::svg_raster::BrandMark;
use crate::compose::visual::{Element, PageVisual, PhotoElement, TextBlock, VerticalAlign};
use crate::config::JournalConfig;
use crate::document::assemble::PageRaster;
use crate::foundation::core::{Affine, PageCanvas, Rect, Rgba8};
use crate::foundation::error::{KeepsakeError, KeepsakeResult};
use crate::render::encode::encode_jpeg;
use crate::render::shadow::shadow_sprite;

/// Unencoded page pixels, premultiplied RGBA8, row-major.
#[derive(Clone, Debug)]
pub struct PageRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PageRgba {
    /// Premultiplied `[r, g, b, a]` at device pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Fonts and brand mark loaded once per run and shared by every rasterizer.
#[derive(Clone, Debug, Default)]
pub struct RenderAssets {
    pub fonts: FontSet,
    pub brand: Option<BrandMark>,
}

impl RenderAssets {
    pub fn load(cfg: &JournalConfig) -> KeepsakeResult<Self> {
        let fonts = FontSet::load(&cfg.fonts)?;
        let brand = cfg.brand_svg.as_deref().map(BrandMark::load).transpose()?;
        Ok(Self { fonts, brand })
    }
}

/// Renders [`PageVisual`]s onto an isolated CPU surface.
///
/// One rasterizer per worker: it owns its text layout state and creates a fresh render context for
/// every page, so nothing is shared between concurrently rendering pages.
pub struct Rasterizer {
    canvas: PageCanvas,
    width: u16,
    height: u16,
    jpeg_quality: u8,
    text: TextLayoutEngine,
    brand: Option<BrandMark>,
    has_fonts: bool,
}

impl Rasterizer {
    pub fn new(cfg: &JournalConfig, assets: &RenderAssets) -> KeepsakeResult<Self> {
        let (w, h) = cfg.canvas.pixel_size()?;
        let width: u16 = w
            .try_into()
            .map_err(|_| KeepsakeError::environment("page width exceeds u16"))?;
        let height: u16 = h
            .try_into()
            .map_err(|_| KeepsakeError::environment("page height exceeds u16"))?;
        Ok(Self {
            canvas: cfg.canvas,
            width,
            height,
            jpeg_quality: cfg.jpeg_quality,
            text: TextLayoutEngine::new(&assets.fonts)?,
            brand: assets.brand.clone(),
            has_fonts: !assets.fonts.is_empty(),
        })
    }

    /// Render and JPEG-encode one page.
    #[tracing::instrument(skip_all, fields(page = visual.index, kind = ?visual.kind))]
    pub fn rasterize(&mut self, visual: &PageVisual) -> KeepsakeResult<PageRaster> {
        let frame = self.render_rgba(visual)?;
        let jpeg = encode_jpeg(&frame, self.jpeg_quality)?;
        tracing::debug!(bytes = jpeg.len(), "page encoded");
        Ok(PageRaster {
            index: visual.index,
            kind: visual.kind,
            width: frame.width,
            height: frame.height,
            jpeg,
        })
    }

    /// Render one page to premultiplied RGBA8 at device resolution.
    ///
    /// Every image is fitted and every paragraph shaped before the context is flushed, so the
    /// returned pixels are final.
    pub fn render_rgba(&mut self, visual: &PageVisual) -> KeepsakeResult<PageRgba> {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(Rgba8 {
            a: 255,
            ..visual.background
        }));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));

        for element in &visual.elements {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            match element {
                Element::Fill { rect, color } => {
                    ctx.set_transform(affine_to_cpu(self.page_transform()));
                    ctx.set_paint(color_to_cpu(*color));
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
                Element::Photo(photo) => self.draw_photo(&mut ctx, photo)?,
                Element::Text(block) => self.draw_text(&mut ctx, block)?,
                Element::Brand { rect, fallback } => match self.brand.clone() {
                    Some(mark) => self.draw_brand(&mut ctx, &mark, *rect)?,
                    None => self.draw_text(&mut ctx, fallback)?,
                },
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(PageRgba {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }

    fn page_transform(&self) -> Affine {
        Affine::scale(self.canvas.scale)
    }

    /// Snap a logical rect to whole device pixels: `(x, y, width, height)`.
    fn device_rect(&self, rect: Rect) -> (f64, f64, u32, u32) {
        let s = self.canvas.scale;
        let x0 = (rect.x0 * s).round();
        let y0 = (rect.y0 * s).round();
        let w = ((rect.x1 * s).round() - x0).max(1.0);
        let h = ((rect.y1 * s).round() - y0).max(1.0);
        (x0, y0, w as u32, h as u32)
    }

    fn draw_photo(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        photo: &PhotoElement,
    ) -> KeepsakeResult<()> {
        let (x, y, w, h) = self.device_rect(photo.rect);

        if let Some(shadow) = photo.shadow {
            let s = self.canvas.scale;
            let sprite = shadow_sprite(w, h, (shadow.blur * s) as f32, shadow.color)?;
            let paint = premul_image(&sprite.rgba8_premul, sprite.width, sprite.height)?;
            let pad = f64::from(sprite.pad);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                x + (shadow.offset_x * s).round() - pad,
                y + (shadow.offset_y * s).round() - pad,
            )));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(sprite.width),
                f64::from(sprite.height),
            ));
        }

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        let target = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        match photo.image.image() {
            Some(decoded) => {
                let mut fitted = fit_cover(decoded, w, h).into_raw();
                premultiply_rgba8_in_place(&mut fitted);
                ctx.set_paint(premul_image(&fitted, w, h)?);
            }
            None => {
                tracing::debug!(photo = %photo.photo, "drawing placeholder for unavailable photo");
                ctx.set_paint(color_to_cpu(photo.placeholder));
            }
        }
        ctx.fill_rect(&target);
        Ok(())
    }

    fn draw_brand(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        mark: &BrandMark,
        rect: Rect,
    ) -> KeepsakeResult<()> {
        let (x, y, w, h) = self.device_rect(rect);
        let (mw, mh) = mark.fit_within(w, h);
        let pixels = mark.rasterize_premul_rgba8(mw, mh)?;
        let ox = x + f64::from(w.saturating_sub(mw) / 2);
        let oy = y + f64::from(h.saturating_sub(mh) / 2);

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((ox, oy)));
        ctx.set_paint(premul_image(&pixels, mw, mh)?);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(mw),
            f64::from(mh),
        ));
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        block: &TextBlock,
    ) -> KeepsakeResult<()> {
        if block.paragraphs.is_empty() {
            return Ok(());
        }
        if !self.has_fonts {
            tracing::debug!(
                text = %block.paragraphs[0].text,
                "no font available, skipping text block"
            );
            return Ok(());
        }

        let max_width = block.frame.width() as f32;
        let mut shaped: Vec<ShapedText> = Vec::with_capacity(block.paragraphs.len());
        for para in &block.paragraphs {
            if let Some(s) = self.text.layout(para, max_width, block.align)? {
                shaped.push(s);
            }
        }
        if shaped.is_empty() {
            return Ok(());
        }

        let total_h: f64 = shaped.iter().map(ShapedText::height).sum::<f64>()
            + block.gap * (shaped.len() - 1) as f64;
        let mut y = match block.v_align {
            VerticalAlign::Top => block.frame.y0,
            VerticalAlign::Center => block.frame.y0 + (block.frame.height() - total_h) / 2.0,
            VerticalAlign::Bottom => block.frame.y1 - total_h,
        };

        let layered = block.opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(block.opacity);
        }
        for s in &shaped {
            let xf = self.page_transform() * Affine::translate((block.frame.x0, y));
            ctx.set_transform(affine_to_cpu(xf));
            draw_shaped(ctx, s);
            y += s.height() + block.gap;
        }
        if layered {
            ctx.pop_layer();
        }
        Ok(())
    }
}

/// Stroke width for faux bold, as a fraction of the font size.
const FAUX_BOLD_EM: f32 = 0.04;

fn draw_shaped(ctx: &mut vello_cpu::RenderContext, shaped: &ShapedText) {
    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs: Vec<vello_cpu::Glyph> = run
                .positioned_glyphs()
                .map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                })
                .collect();

            // Only one face per role is registered, so italic and bold runs come back from parley
            // as synthesis requests on the regular face.
            let font_size = run.run().font_size();
            let synthesis = run.run().synthesis();
            let skew = synthesis.skew().map(faux_italic);

            let mut fill = ctx.glyph_run(&shaped.font).font_size(font_size);
            if let Some(t) = skew {
                fill = fill.glyph_transform(t);
            }
            fill.fill_glyphs(glyphs.iter().copied());

            if synthesis.embolden() {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(
                    font_size * FAUX_BOLD_EM,
                )));
                let mut stroke = ctx.glyph_run(&shaped.font).font_size(font_size);
                if let Some(t) = skew {
                    stroke = stroke.glyph_transform(t);
                }
                stroke.stroke_glyphs(glyphs.iter().copied());
            }
        }
    }
}

/// Horizontal skew leaning glyph tops right by `degrees`.
///
/// Glyph outlines are already y-down when this transform applies, so the shear factor is negated.
fn faux_italic(degrees: f32) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::skew(-f64::from(degrees.to_radians().tan()), 0.0)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

/// Wrap premultiplied RGBA8 bytes as an image paint.
fn premul_image(rgba8_premul: &[u8], width: u32, height: u32) -> KeepsakeResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| KeepsakeError::environment("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| KeepsakeError::environment("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(KeepsakeError::environment("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
