use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::compose::visual::{FontRole, Paragraph, TextAlign};
use crate::config::FontConfig;
use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// Raw bytes of one font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file (0 for plain TTF/OTF).
    pub index: u32,
}

/// The serif and sans faces used by every page of a journal.
///
/// A missing role borrows the other role's face; with no faces at all, text is not drawn.
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    pub serif: Option<FontFace>,
    pub sans: Option<FontFace>,
}

const SERIF_FAMILIES: &[&str] = &[
    "Playfair Display",
    "DejaVu Serif",
    "Liberation Serif",
    "Noto Serif",
    "Georgia",
    "Times New Roman",
];
const SANS_FAMILIES: &[&str] = &[
    "Lato",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "Arial",
];

impl FontSet {
    /// Load configured font files; fall back to system fonts for roles without a file.
    ///
    /// A configured file that cannot be read is an environment error. Missing system fonts are not.
    pub fn load(cfg: &FontConfig) -> KeepsakeResult<Self> {
        let mut set = Self {
            serif: cfg.serif.as_deref().map(read_face).transpose()?,
            sans: cfg.sans.as_deref().map(read_face).transpose()?,
        };

        if cfg.system_fallback && (set.serif.is_none() || set.sans.is_none()) {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system font database");
            if set.serif.is_none() {
                set.serif = query_system(&db, SERIF_FAMILIES, usvg::fontdb::Family::Serif);
            }
            if set.sans.is_none() {
                set.sans = query_system(&db, SANS_FAMILIES, usvg::fontdb::Family::SansSerif);
            }
        }

        if set.is_empty() {
            tracing::warn!("no usable fonts found; captions and titles will not be drawn");
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.serif.is_none() && self.sans.is_none()
    }

    pub fn face(&self, role: FontRole) -> Option<&FontFace> {
        match role {
            FontRole::Serif => self.serif.as_ref().or(self.sans.as_ref()),
            FontRole::Sans => self.sans.as_ref().or(self.serif.as_ref()),
        }
    }
}

fn read_face(path: &Path) -> KeepsakeResult<FontFace> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read font '{}'", path.display()))
        .map_err(|e| KeepsakeError::environment(format!("{e:#}")))?;
    Ok(FontFace {
        bytes: Arc::new(bytes),
        index: 0,
    })
}

fn query_system(
    db: &usvg::fontdb::Database,
    names: &[&str],
    generic: usvg::fontdb::Family<'_>,
) -> Option<FontFace> {
    let mut families: Vec<usvg::fontdb::Family<'_>> =
        names.iter().map(|n| usvg::fontdb::Family::Name(*n)).collect();
    families.push(generic);
    let query = usvg::fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    db.with_face_data(id, |data, index| FontFace {
        bytes: Arc::new(data.to_vec()),
        index,
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// A shaped paragraph ready to be drawn, plus the face its glyph ids refer to.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl ShapedText {
    pub(crate) fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

struct RegisteredFace {
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Stateful helper for building Parley text layouts from a [`FontSet`].
///
/// Each rasterizer owns one engine; faces are registered once at construction.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    serif: Option<RegisteredFace>,
    sans: Option<RegisteredFace>,
}

impl TextLayoutEngine {
    pub(crate) fn new(fonts: &FontSet) -> KeepsakeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let serif = fonts
            .serif
            .as_ref()
            .map(|f| register_face(&mut font_ctx, f))
            .transpose()?;
        let sans = fonts
            .sans
            .as_ref()
            .map(|f| register_face(&mut font_ctx, f))
            .transpose()?;
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            serif,
            sans,
        })
    }

    fn face(&self, role: FontRole) -> Option<&RegisteredFace> {
        match role {
            FontRole::Serif => self.serif.as_ref().or(self.sans.as_ref()),
            FontRole::Sans => self.sans.as_ref().or(self.serif.as_ref()),
        }
    }

    /// Shape `para` wrapped to `max_width` logical units. `None` when no face is available.
    pub(crate) fn layout(
        &mut self,
        para: &Paragraph,
        max_width: f32,
        align: TextAlign,
    ) -> KeepsakeResult<Option<ShapedText>> {
        if !para.size.is_finite() || para.size <= 0.0 {
            return Err(KeepsakeError::validation(
                "text size must be finite and > 0",
            ));
        }
        let Some(face) = self.face(para.role) else {
            return Ok(None);
        };
        let family_name = face.family_name.clone();
        let font = face.font.clone();

        let c = para.color;
        let brush = TextBrushRgba8 {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        };
        let text = para.text.as_str();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(para.size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if para.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        if let Some(range) = para.emphasis.clone() {
            builder.push(
                parley::style::StyleProperty::FontWeight(parley::style::FontWeight::BOLD),
                range,
            );
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(Some(max_width));
        let alignment = match align {
            TextAlign::Start => parley::Alignment::Start,
            TextAlign::Center => parley::Alignment::Center,
            TextAlign::End => parley::Alignment::End,
        };
        layout.align(
            Some(max_width),
            alignment,
            parley::AlignmentOptions::default(),
        );

        Ok(Some(ShapedText { layout, font }))
    }
}

fn register_face(
    font_ctx: &mut parley::FontContext,
    face: &FontFace,
) -> KeepsakeResult<RegisteredFace> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);
    let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
        KeepsakeError::environment("no font families registered from font bytes")
    })?;
    let family_name = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| KeepsakeError::environment("registered font family has no name"))?
        .to_string();

    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
        face.index,
    );
    Ok(RegisteredFace { family_name, font })
}
