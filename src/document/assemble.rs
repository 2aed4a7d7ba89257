use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary, text_string};

use crate::compose::planner::LayoutKind;
use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// A4 in PDF points.
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// One encoded page image, bound to its plan index.
#[derive(Clone, Debug)]
pub struct PageRaster {
    pub index: usize,
    pub kind: LayoutKind,
    /// Pixel dimensions of the encoded image.
    pub width: u32,
    pub height: u32,
    /// Baseline JPEG bytes.
    pub jpeg: Vec<u8>,
}

/// The finished journal: page rasters in order (cover first), the PDF and its suggested name.
#[derive(Clone, Debug)]
pub struct JournalDocument {
    pub pages: Vec<PageRaster>,
    pub filename: String,
    pub pdf: Vec<u8>,
}

impl JournalDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Write the PDF into `dir` under [`JournalDocument::filename`], creating `dir` if needed.
    pub fn write_to_dir(&self, dir: &Path) -> KeepsakeResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.pdf)?;
        tracing::info!(path = %path.display(), bytes = self.pdf.len(), "journal written");
        Ok(path)
    }
}

/// `<Brand>_<slug>_Journal.pdf`, where each run of non-alphanumeric characters in the event name
/// becomes a single `_`.
pub fn suggested_filename(brand: &str, event_name: &str) -> String {
    fn slug(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut pending_sep = false;
        for ch in s.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push(ch);
            } else {
                pending_sep = true;
            }
        }
        out
    }

    let brand = slug(brand);
    let event = slug(event_name);
    let mut name = String::new();
    for part in [brand.as_str(), event.as_str(), "Journal"] {
        if part.is_empty() {
            continue;
        }
        if !name.is_empty() {
            name.push('_');
        }
        name.push_str(part);
    }
    name.push_str(".pdf");
    name
}

/// Place the cover and content pages, in order, one per A4 page.
///
/// Each raster is stretched to fill its page exactly; page content is not inspected.
#[tracing::instrument(skip_all, fields(pages = pages.len() + 1))]
pub fn assemble(
    cover: PageRaster,
    pages: Vec<PageRaster>,
    event_name: &str,
    brand: &str,
) -> KeepsakeResult<JournalDocument> {
    let mut all = Vec::with_capacity(pages.len() + 1);
    all.push(cover);
    all.extend(pages);

    let pdf = write_pdf(&all, event_name)?;
    tracing::debug!(bytes = pdf.len(), "pdf assembled");
    Ok(JournalDocument {
        pages: all,
        filename: suggested_filename(brand, event_name),
        pdf,
    })
}

fn write_pdf(pages: &[PageRaster], title: &str) -> KeepsakeResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(page.width),
                "Height" => i64::from(page.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            page.jpeg.clone(),
        );
        let image_id = doc.add_object(image);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        A4_WIDTH_PT.into(),
                        0.into(),
                        0.into(),
                        A4_HEIGHT_PT.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| KeepsakeError::encoding(format!("page {} content: {e}", page.index)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH_PT.into(), A4_HEIGHT_PT.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        // Non-ASCII titles are written as UTF-16BE with a BOM.
        "Title" => text_string(title),
        "Producer" => Object::string_literal(concat!("keepsake ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/document/assemble.rs"]
mod tests;
