use crate::assets::resolve::ResolvedImages;
use crate::compose::planner::{LayoutKind, PagePlan};
use crate::compose::visual::{
    Element, FontRole, PageVisual, Paragraph, PhotoElement, Shadow, TextAlign, TextBlock,
    VerticalAlign,
};
use crate::config::{JournalConfig, Palette};
use crate::foundation::core::{PageCanvas, Rect, Rgba8};
use crate::foundation::error::{KeepsakeError, KeepsakeResult};
use crate::model::{JournalRequest, Photo};

const CAPTION_SIZE: f32 = 10.0;
const CAPTION_GAP: f64 = 20.0;
const FOOTER_OPACITY: f32 = 0.6;

const PHOTO_SHADOW: Shadow = Shadow {
    offset_x: 2.0,
    offset_y: 4.0,
    blur: 6.0,
    color: Rgba8::rgba(0, 0, 0, 20),
};
const OVERLAY_SHADOW: Shadow = Shadow {
    offset_x: 4.0,
    offset_y: 8.0,
    blur: 12.0,
    color: Rgba8::rgba(0, 0, 0, 31),
};

/// Builds page visuals for one journal.
///
/// Pure geometry: no text shaping happens here, so composing a page never touches fonts.
#[derive(Clone, Debug)]
pub struct PageCompositor<'a> {
    canvas: PageCanvas,
    palette: &'a Palette,
    brand: &'a str,
    event_name: &'a str,
    event_date: &'a str,
}

impl<'a> PageCompositor<'a> {
    pub fn new(cfg: &'a JournalConfig, request: &'a JournalRequest) -> Self {
        Self {
            canvas: cfg.canvas,
            palette: &cfg.palette,
            brand: &cfg.brand,
            event_name: &request.event_name,
            event_date: &request.event_date,
        }
    }

    /// Compose the page described by `plan`.
    ///
    /// `photos` is the full ordered photo list the plan was computed from. A plan whose photo
    /// range or ids disagree with `photos` is an internal error.
    pub fn compose(
        &self,
        plan: &PagePlan,
        photos: &[Photo],
        images: &ResolvedImages,
    ) -> KeepsakeResult<PageVisual> {
        let page_photos = photos.get(plan.photo_range.clone()).ok_or_else(|| {
            KeepsakeError::Other(anyhow::anyhow!(
                "page {} references photos {:?} but only {} exist",
                plan.index,
                plan.photo_range,
                photos.len()
            ))
        })?;
        if page_photos.len() != plan.kind.slots()
            || page_photos
                .iter()
                .zip(&plan.photo_ids)
                .any(|(p, id)| &p.id != id)
        {
            return Err(KeepsakeError::Other(anyhow::anyhow!(
                "page {} is {:?} with {} slots but was given {} photos",
                plan.index,
                plan.kind,
                plan.kind.slots(),
                page_photos.len()
            )));
        }

        let mut elements = match plan.kind {
            LayoutKind::Cover => self.cover(),
            LayoutKind::LayoutA => self.layout_a(page_photos, images),
            LayoutKind::LayoutB => self.layout_b(page_photos, images),
            LayoutKind::LayoutC => self.layout_c(page_photos, images),
        };
        let page_number = plan.page_number();
        if let Some(n) = page_number {
            elements.extend(self.footer(n));
        }

        Ok(PageVisual {
            index: plan.index,
            kind: plan.kind,
            page_number,
            background: self.palette.paper,
            elements,
        })
    }

    fn cover(&self) -> Vec<Element> {
        const BRAND_H: f64 = 108.0;
        const NAME_H: f64 = 24.0;
        const DATE_H: f64 = 20.0;
        let stack_h = BRAND_H + 25.0 + 1.0 + 35.0 + NAME_H + 15.0 + DATE_H;

        let w = self.canvas.width;
        let cx = w / 2.0;
        let column = |y0: f64, h: f64| Rect::new(60.0, y0, w - 60.0, y0 + h);
        let mut y = (self.canvas.height - stack_h) / 2.0;

        let mut out = Vec::with_capacity(4);
        let brand_rect = column(y, BRAND_H);
        out.push(Element::Brand {
            rect: brand_rect,
            fallback: TextBlock::new(
                brand_rect,
                vec![Paragraph::new(
                    self.brand.to_uppercase(),
                    FontRole::Serif,
                    90.0,
                    self.palette.title,
                )],
            )
            .aligned(TextAlign::Center, VerticalAlign::Center),
        });
        y += BRAND_H + 25.0;

        out.push(Element::Fill {
            rect: Rect::new(cx - 25.0, y, cx + 25.0, y + 1.0),
            color: self.palette.accent,
        });
        y += 1.0 + 35.0;

        out.push(Element::Text(
            TextBlock::new(
                column(y, NAME_H),
                vec![Paragraph::new(
                    self.event_name.to_uppercase(),
                    FontRole::Sans,
                    16.0,
                    self.palette.caption,
                )],
            )
            .aligned(TextAlign::Center, VerticalAlign::Top),
        ));
        y += NAME_H + 15.0;

        if !self.event_date.trim().is_empty() {
            out.push(Element::Text(
                TextBlock::new(
                    column(y, DATE_H),
                    vec![
                        Paragraph::new(
                            self.event_date.trim(),
                            FontRole::Serif,
                            14.0,
                            self.palette.muted,
                        )
                        .italic(),
                    ],
                )
                .aligned(TextAlign::Center, VerticalAlign::Top),
            ));
        }
        out
    }

    /// Primary photo on a 72/28 grid, second photo pinned over its bottom-right corner, captions in
    /// the sidebar.
    fn layout_a(&self, photos: &[Photo], images: &ResolvedImages) -> Vec<Element> {
        let content = self.content_box(60.0, 50.0);
        let main_w = content.width() * 0.72;
        let main = Rect::new(
            content.x0,
            content.y0,
            content.x0 + main_w,
            content.y0 + content.height() * 0.85,
        );

        const BORDER: f64 = 8.0;
        let overlay = Rect::new(
            main.x1 + 30.0 - 240.0,
            main.y1 + 40.0 - 300.0,
            main.x1 + 30.0,
            main.y1 + 40.0,
        );

        let mut out = vec![self.photo(main, &photos[0], images, Some(PHOTO_SHADOW))];
        out.push(self.photo(overlay, &photos[1], images, Some(OVERLAY_SHADOW)));
        // Paper border drawn over the overlay edges so the photo reads as a mounted print.
        out.extend(frame_border(overlay, BORDER, self.palette.paper));

        let sidebar = Rect::new(
            main.x1 + 25.0,
            content.y0,
            content.x1,
            content.y1 - 120.0,
        );
        let captions: Vec<Paragraph> = photos
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.caption(i, p))
            .collect();
        if !captions.is_empty() {
            out.push(Element::Text(
                TextBlock::new(sidebar, captions)
                    .aligned(TextAlign::Start, VerticalAlign::Bottom)
                    .with_gap(CAPTION_GAP),
            ));
        }
        out
    }

    /// Full-height left column, two stacked photos on the right, one caption column per photo.
    fn layout_b(&self, photos: &[Photo], images: &ResolvedImages) -> Vec<Element> {
        const GUTTER: f64 = 25.0;
        const COLUMN_H: f64 = 650.0;

        let content = self.content_box(80.0, 60.0);
        let col_w = (content.width() - GUTTER) / 2.0;
        let top = content.y0 + (content.height() - COLUMN_H) / 2.0;
        let bottom = top + COLUMN_H;
        let half_h = (COLUMN_H - GUTTER) / 2.0;

        let left = Rect::new(content.x0, top, content.x0 + col_w, bottom);
        let right_x0 = left.x1 + GUTTER;
        let upper = Rect::new(right_x0, top, content.x1, top + half_h);
        let lower = Rect::new(right_x0, bottom - half_h, content.x1, bottom);

        let mut out: Vec<Element> = [left, upper, lower]
            .into_iter()
            .zip(photos)
            .map(|(rect, p)| self.photo(rect, p, images, Some(PHOTO_SHADOW)))
            .collect();

        let row_bottom = self.canvas.height - 85.0;
        let row_top = bottom + CAPTION_GAP;
        let row_x0 = 60.0;
        let row_w = self.canvas.width - 120.0;
        let cell_w = (row_w - CAPTION_GAP * 2.0) / 3.0;
        for (i, p) in photos.iter().enumerate() {
            let Some(caption) = self.caption(i, p) else {
                continue;
            };
            let x0 = row_x0 + (cell_w + CAPTION_GAP) * i as f64;
            out.push(Element::Text(
                TextBlock::new(Rect::new(x0, row_top, x0 + cell_w, row_bottom), vec![caption])
                    .aligned(TextAlign::Start, VerticalAlign::Bottom),
            ));
        }
        out
    }

    /// A single fixed 450x550 frame, centered, with the caption as a quotation beneath it.
    fn layout_c(&self, photos: &[Photo], images: &ResolvedImages) -> Vec<Element> {
        const FRAME_W: f64 = 450.0;
        const FRAME_H: f64 = 550.0;
        const QUOTE_BAND: f64 = 34.0;

        let group_h = FRAME_H + 30.0 + QUOTE_BAND;
        let x0 = (self.canvas.width - FRAME_W) / 2.0;
        let y0 = (self.canvas.height - group_h) / 2.0;
        let frame = Rect::new(x0, y0, x0 + FRAME_W, y0 + FRAME_H);

        let photo = &photos[0];
        let mut out = vec![self.photo(frame, photo, images, Some(PHOTO_SHADOW))];
        if let Some(text) = photo.caption_text() {
            let cx = self.canvas.width / 2.0;
            let quote_top = frame.y1 + 30.0;
            out.push(Element::Text(
                TextBlock::new(
                    Rect::new(cx - 200.0, quote_top, cx + 200.0, quote_top + QUOTE_BAND),
                    vec![Paragraph::new(
                        format!("\u{201C}{text}\u{201D}"),
                        FontRole::Serif,
                        11.0,
                        self.palette.quote,
                    )
                    .italic()],
                )
                .aligned(TextAlign::Center, VerticalAlign::Top),
            ));
        }
        out
    }

    /// Short vertical rule plus the page number, anchored bottom-right.
    fn footer(&self, number: u32) -> Vec<Element> {
        const RIGHT: f64 = 45.0;
        const BOTTOM: f64 = 40.0;
        const NUMBER_SIZE: f32 = 12.0;
        const RULE_H: f64 = 14.0;

        let label = number.to_string();
        // Old-style serif digits are roughly 0.6em wide.
        let label_w = label.len() as f64 * f64::from(NUMBER_SIZE) * 0.6;
        let x1 = self.canvas.width - RIGHT;
        let y1 = self.canvas.height - BOTTOM;
        let mid_y = y1 - RULE_H / 2.0;
        let rule_x = x1 - label_w - 10.0 - 1.0;

        vec![
            Element::Fill {
                rect: Rect::new(rule_x, y1 - RULE_H, rule_x + 1.0, y1),
                color: self.palette.ink.with_opacity(f64::from(FOOTER_OPACITY)),
            },
            Element::Text(
                TextBlock::new(
                    Rect::new(x1 - label_w - 8.0, mid_y - 10.0, x1, mid_y + 10.0),
                    vec![Paragraph::new(
                        label,
                        FontRole::Serif,
                        NUMBER_SIZE,
                        self.palette.ink,
                    )],
                )
                .aligned(TextAlign::End, VerticalAlign::Center)
                .with_opacity(FOOTER_OPACITY),
            ),
        ]
    }

    /// Page bounds minus symmetric `(vertical, horizontal)` padding.
    fn content_box(&self, pad_v: f64, pad_h: f64) -> Rect {
        Rect::new(
            pad_h,
            pad_v,
            self.canvas.width - pad_h,
            self.canvas.height - pad_v,
        )
    }

    fn photo(
        &self,
        rect: Rect,
        photo: &Photo,
        images: &ResolvedImages,
        shadow: Option<Shadow>,
    ) -> Element {
        Element::Photo(PhotoElement {
            rect,
            photo: photo.id.clone(),
            image: images.get(photo).clone(),
            placeholder: self.palette.placeholder,
            shadow,
        })
    }

    /// `"NN. caption"` with the number in bold, or `None` when the photo has no caption.
    fn caption(&self, slot: usize, photo: &Photo) -> Option<Paragraph> {
        let text = photo.caption_text()?;
        let prefix = format!("{:02}.", slot + 1);
        let emphasis = 0..prefix.len();
        Some(
            Paragraph::new(
                format!("{prefix} {text}"),
                FontRole::Sans,
                CAPTION_SIZE,
                self.palette.caption,
            )
            .emphasize(emphasis),
        )
    }
}

/// Four bands of width `w` lining the inside of `rect`.
fn frame_border(rect: Rect, w: f64, color: Rgba8) -> [Element; 4] {
    [
        Element::Fill {
            rect: Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + w),
            color,
        },
        Element::Fill {
            rect: Rect::new(rect.x0, rect.y1 - w, rect.x1, rect.y1),
            color,
        },
        Element::Fill {
            rect: Rect::new(rect.x0, rect.y0 + w, rect.x0 + w, rect.y1 - w),
            color,
        },
        Element::Fill {
            rect: Rect::new(rect.x1 - w, rect.y0 + w, rect.x1, rect.y1 - w),
            color,
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layouts.rs"]
mod tests;
