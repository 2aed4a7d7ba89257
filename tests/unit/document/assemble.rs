use super::*;

fn tiny_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 6, image::Rgb([0xF9, 0xF7, 0xF2]));
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 85)
        .encode(img.as_raw(), 4, 6, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

fn raster(index: usize, kind: LayoutKind) -> PageRaster {
    PageRaster {
        index,
        kind,
        width: 4,
        height: 6,
        jpeg: tiny_jpeg(),
    }
}

#[test]
fn filename_collapses_separator_runs() {
    assert_eq!(
        suggested_filename("Aura", "Boda Ana & Luis"),
        "Aura_Boda_Ana_Luis_Journal.pdf"
    );
    assert_eq!(
        suggested_filename("Aura", "  XV años!! 2026 "),
        "Aura_XV_a_os_2026_Journal.pdf"
    );
    assert_eq!(suggested_filename("Aura", "***"), "Aura_Journal.pdf");
}

#[test]
fn pdf_has_one_page_per_raster_in_order() {
    let doc = assemble(
        raster(0, LayoutKind::Cover),
        vec![raster(1, LayoutKind::LayoutA), raster(2, LayoutKind::LayoutC)],
        "Boda Ana & Luis",
        "Aura",
    )
    .unwrap();
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.pages[0].kind, LayoutKind::Cover);
    assert_eq!(doc.filename, "Aura_Boda_Ana_Luis_Journal.pdf");
    assert!(doc.pdf.starts_with(b"%PDF-1.5"));

    let parsed = lopdf::Document::load_mem(&doc.pdf).unwrap();
    let pages = parsed.get_pages();
    assert_eq!(pages.len(), 3);

    let first = parsed.get_dictionary(pages[&1]).unwrap();
    let media_box = first.get(b"MediaBox").unwrap().as_array().unwrap();
    let w = media_box[2].as_float().unwrap();
    let h = media_box[3].as_float().unwrap();
    assert!((w - A4_WIDTH_PT).abs() < 0.01);
    assert!((h - A4_HEIGHT_PT).abs() < 0.01);
}

#[test]
fn cover_only_document_is_valid() {
    let doc = assemble(raster(0, LayoutKind::Cover), Vec::new(), "Cena", "Aura").unwrap();
    let parsed = lopdf::Document::load_mem(&doc.pdf).unwrap();
    assert_eq!(parsed.get_pages().len(), 1);
}

#[test]
fn write_to_dir_uses_suggested_filename() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("target/assemble_unit");
    let _ = std::fs::remove_dir_all(&dir);
    let doc = assemble(raster(0, LayoutKind::Cover), Vec::new(), "Cena Fin", "Aura").unwrap();
    let path = doc.write_to_dir(&dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "Aura_Cena_Fin_Journal.pdf");
    assert_eq!(std::fs::read(&path).unwrap(), doc.pdf);
}

#[test]
fn info_title_round_trips_non_ascii_event_names() {
    for name in ["Cena de Gala", "XV años de Sofía “Sofi”"] {
        let doc = assemble(raster(0, LayoutKind::Cover), Vec::new(), name, "Aura").unwrap();
        let parsed = lopdf::Document::load_mem(&doc.pdf).unwrap();
        let info_id = parsed
            .trailer
            .get(b"Info")
            .unwrap()
            .as_reference()
            .unwrap();
        let title = parsed
            .get_dictionary(info_id)
            .unwrap()
            .get(b"Title")
            .unwrap();
        assert_eq!(lopdf::decode_text_string(title).unwrap(), name);
        if !name.is_ascii() {
            assert!(title.as_str().unwrap().starts_with(b"\xFE\xFF"));
        }
    }
}
