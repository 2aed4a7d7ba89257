//! Keepsake turns an ordered list of event photos into a printable photo-journal PDF.
//!
//! The pipeline is:
//!
//! - resolve every photo source to decoded pixels (failures become placeholders)
//! - [`plan`] the pages: a cover, then content pages cycling through three layouts
//! - compose each page into a [`PageVisual`] and rasterize it on the CPU
//! - assemble the JPEG page rasters into one A4 PDF ([`JournalDocument`])
//!
//! [`generate_journal`] runs the whole thing.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod compose;
pub mod config;
pub(crate) mod document;
pub mod model;
pub(crate) mod render;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{PageCanvas, Rect, Rgba8};
pub use crate::foundation::error::{KeepsakeError, KeepsakeResult};

pub use crate::assets::decode::DecodedImage;
pub use crate::assets::fetch::{SourceFetcher, SourceLocator};
pub use crate::assets::fonts::{FontFace, FontSet};
pub use crate::assets::resolve::{ImageResolver, ResolveError, ResolvedImage, ResolvedImages};
pub use crate::assets::svg_raster::BrandMark;
pub use crate::compose::layouts::PageCompositor;
pub use crate::compose::planner::{LayoutKind, PagePlan, content_pages, plan};
pub use crate::compose::visual::{
    Element, FontRole, PageVisual, Paragraph, PhotoElement, Shadow, TextAlign, TextBlock,
    VerticalAlign,
};
pub use crate::config::{FetchConfig, FontConfig, JournalConfig, Palette, ThreadingConfig};
pub use crate::document::assemble::{
    JournalDocument, PageRaster, assemble, suggested_filename,
};
pub use crate::model::{JournalRequest, Photo, PhotoId};
pub use crate::render::cpu::{PageRgba, Rasterizer, RenderAssets};
pub use crate::render::encode::{encode_jpeg, encode_png};
pub use crate::render::pipeline::{generate_journal, render_page_preview};
