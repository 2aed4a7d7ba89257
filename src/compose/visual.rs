use std::ops::Range;

use crate::assets::resolve::ResolvedImage;
use crate::compose::planner::LayoutKind;
use crate::foundation::core::{Rect, Rgba8};
use crate::model::PhotoId;

/// Full-page visual description produced by the compositor.
///
/// Everything is in logical page units. Elements are drawn in order, so later elements sit above
/// earlier ones.
#[derive(Clone, Debug)]
pub struct PageVisual {
    pub index: usize,
    pub kind: LayoutKind,
    pub page_number: Option<u32>,
    pub background: Rgba8,
    pub elements: Vec<Element>,
}

impl PageVisual {
    /// Photo elements in paint order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoElement> {
        self.elements.iter().filter_map(|e| match e {
            Element::Photo(p) => Some(p),
            _ => None,
        })
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum Element {
    /// Solid fill: borders, rules, dividers.
    Fill { rect: Rect, color: Rgba8 },
    Photo(PhotoElement),
    Text(TextBlock),
    /// Slot for the brand mark on the cover. Drawn as the brand SVG when one is configured,
    /// otherwise as `fallback` text.
    Brand { rect: Rect, fallback: TextBlock },
}

/// An image slot. The image is fitted with cover semantics (scale to fill, center crop).
#[derive(Clone, Debug)]
pub struct PhotoElement {
    pub rect: Rect,
    pub photo: PhotoId,
    pub image: ResolvedImage,
    /// Fill used when `image` is unavailable.
    pub placeholder: Rgba8,
    pub shadow: Option<Shadow>,
}

/// Soft drop shadow behind a photo slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    /// Gaussian standard deviation in logical units.
    pub blur: f64,
    pub color: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontRole {
    Serif,
    Sans,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// One run of styled text. `emphasis` is a byte range drawn in bold.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub role: FontRole,
    pub size: f32,
    pub color: Rgba8,
    pub italic: bool,
    pub emphasis: Option<Range<usize>>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, role: FontRole, size: f32, color: Rgba8) -> Self {
        Self {
            text: text.into(),
            role,
            size,
            color,
            italic: false,
            emphasis: None,
        }
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn emphasize(mut self, range: Range<usize>) -> Self {
        self.emphasis = Some(range);
        self
    }
}

/// Paragraphs stacked inside a frame.
///
/// The compositor fixes the frame; the rasterizer shapes the paragraphs, wraps them to the frame
/// width and places the stack according to `v_align`. Text never moves other elements.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub frame: Rect,
    pub align: TextAlign,
    pub v_align: VerticalAlign,
    /// Vertical space between consecutive paragraphs.
    pub gap: f64,
    /// Opacity applied to the whole block.
    pub opacity: f32,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBlock {
    pub fn new(frame: Rect, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            frame,
            align: TextAlign::Start,
            v_align: VerticalAlign::Top,
            gap: 0.0,
            opacity: 1.0,
            paragraphs,
        }
    }

    pub fn aligned(mut self, align: TextAlign, v_align: VerticalAlign) -> Self {
        self.align = align;
        self.v_align = v_align;
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}
