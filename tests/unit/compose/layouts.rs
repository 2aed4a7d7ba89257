use std::sync::Arc;

use super::*;
use crate::assets::decode::DecodedImage;
use crate::assets::resolve::ResolvedImage;
use crate::compose::planner::plan;

fn request(n: usize) -> JournalRequest {
    JournalRequest {
        event_name: "Boda Ana & Luis".to_string(),
        event_date: "12 de octubre".to_string(),
        photos: (0..n)
            .map(|i| {
                let p = Photo::new(format!("p{i}"), format!("/photos/{i}.jpg"));
                if i % 2 == 0 {
                    p.with_caption(format!("momento {i}"))
                } else {
                    p
                }
            })
            .collect(),
    }
}

fn all_ready(req: &JournalRequest) -> ResolvedImages {
    let mut images = ResolvedImages::default();
    for p in &req.photos {
        images.insert(
            p,
            ResolvedImage::Ready(DecodedImage {
                width: 4,
                height: 3,
                rgba8: Arc::new(image::RgbaImage::new(4, 3)),
            }),
        );
    }
    images
}

fn compose_all(req: &JournalRequest, images: &ResolvedImages) -> Vec<PageVisual> {
    let cfg = JournalConfig::default();
    let compositor = PageCompositor::new(&cfg, req);
    plan(&req.photos)
        .iter()
        .map(|p| compositor.compose(p, &req.photos, images).unwrap())
        .collect()
}

fn inside(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

#[test]
fn cover_has_brand_divider_name_and_date_but_no_number() {
    let req = request(0);
    let pages = compose_all(&req, &ResolvedImages::default());
    assert_eq!(pages.len(), 1);
    let cover = &pages[0];
    assert_eq!(cover.kind, LayoutKind::Cover);
    assert_eq!(cover.page_number, None);
    assert_eq!(cover.photos().count(), 0);

    let Element::Brand { fallback, .. } = &cover.elements[0] else {
        panic!("cover starts with the brand slot");
    };
    assert_eq!(fallback.paragraphs[0].text, "AURA");
    assert_eq!(fallback.paragraphs[0].size, 90.0);

    let texts: Vec<&str> = cover
        .text_blocks()
        .map(|t| t.paragraphs[0].text.as_str())
        .collect();
    assert_eq!(texts, vec!["BODA ANA & LUIS", "12 de octubre"]);
    assert!(cover.text_blocks().nth(1).unwrap().paragraphs[0].italic);
}

#[test]
fn cover_omits_blank_date() {
    let mut req = request(0);
    req.event_date = "   ".to_string();
    let pages = compose_all(&req, &ResolvedImages::default());
    assert_eq!(pages[0].text_blocks().count(), 1);
}

#[test]
fn layout_a_overlay_pins_past_primary_corner() {
    let req = request(2);
    let pages = compose_all(&req, &all_ready(&req));
    let page = &pages[1];
    assert_eq!(page.kind, LayoutKind::LayoutA);

    let slots: Vec<&PhotoElement> = page.photos().collect();
    assert_eq!(slots.len(), 2);
    let (main, overlay) = (slots[0].rect, slots[1].rect);
    assert!((main.width() - 694.0 * 0.72).abs() < 1e-9);
    assert!((main.height() - 1003.0 * 0.85).abs() < 1e-9);
    assert_eq!((overlay.width(), overlay.height()), (240.0, 300.0));
    assert!((overlay.x1 - main.x1 - 30.0).abs() < 1e-9);
    assert!((overlay.y1 - main.y1 - 40.0).abs() < 1e-9);

    // Overlay painted after (above) the primary photo.
    let main_pos = page
        .elements
        .iter()
        .position(|e| matches!(e, Element::Photo(p) if p.photo.as_str() == "p0"))
        .unwrap();
    let overlay_pos = page
        .elements
        .iter()
        .position(|e| matches!(e, Element::Photo(p) if p.photo.as_str() == "p1"))
        .unwrap();
    assert!(overlay_pos > main_pos);
}

#[test]
fn layout_a_sidebar_only_lists_present_captions() {
    let req = request(2);
    let pages = compose_all(&req, &all_ready(&req));
    let blocks: Vec<&TextBlock> = pages[1]
        .text_blocks()
        .filter(|t| t.paragraphs[0].size == CAPTION_SIZE)
        .collect();
    assert_eq!(blocks.len(), 1);
    let sidebar = blocks[0];
    assert_eq!(sidebar.v_align, VerticalAlign::Bottom);
    assert_eq!(sidebar.paragraphs.len(), 1);
    assert_eq!(sidebar.paragraphs[0].text, "01. momento 0");
    assert_eq!(sidebar.paragraphs[0].emphasis, Some(0..3));
}

#[test]
fn layout_b_columns_are_centered_and_split() {
    let req = request(5);
    let pages = compose_all(&req, &all_ready(&req));
    let page = &pages[2];
    assert_eq!(page.kind, LayoutKind::LayoutB);

    let rects: Vec<Rect> = page.photos().map(|p| p.rect).collect();
    assert_eq!(rects.len(), 3);
    assert_eq!(rects[0].height(), 650.0);
    assert!(((rects[0].y0 + rects[0].y1) / 2.0 - 1123.0 / 2.0).abs() < 1e-9);
    assert_eq!(rects[1].height(), rects[2].height());
    assert!((rects[2].y0 - rects[1].y1 - 25.0).abs() < 1e-9);
    assert!((rects[1].x0 - rects[0].x1 - 25.0).abs() < 1e-9);

    // Photos p2..p4; captions on p2 and p4 keep their slot numbers.
    let captions: Vec<&str> = page
        .text_blocks()
        .filter(|t| t.paragraphs[0].size == CAPTION_SIZE)
        .map(|t| t.paragraphs[0].text.as_str())
        .collect();
    assert_eq!(captions, vec!["01. momento 2", "03. momento 4"]);
}

#[test]
fn layout_c_frame_is_fixed_and_quote_is_centered() {
    let req = request(1);
    let pages = compose_all(&req, &all_ready(&req));
    let page = &pages[1];
    assert_eq!(page.kind, LayoutKind::LayoutC);
    let frame = page.photos().next().unwrap().rect;
    assert_eq!((frame.width(), frame.height()), (450.0, 550.0));
    assert!(((frame.x0 + frame.x1) / 2.0 - 397.0).abs() < 1e-9);

    let quote = page
        .text_blocks()
        .find(|t| t.align == TextAlign::Center)
        .unwrap();
    assert_eq!(quote.paragraphs[0].text, "\u{201C}momento 0\u{201D}");
    assert!(quote.frame.width() <= 400.0);
    assert!(quote.frame.y0 >= frame.y1 + 30.0);
}

#[test]
fn every_content_page_is_numbered_from_one() {
    let req = request(9);
    let pages = compose_all(&req, &all_ready(&req));
    let numbers: Vec<Option<u32>> = pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers[0], None);
    for (i, n) in numbers.iter().enumerate().skip(1) {
        assert_eq!(*n, Some(i as u32));
        let label = pages[i]
            .text_blocks()
            .find(|t| t.align == TextAlign::End)
            .unwrap();
        assert_eq!(label.paragraphs[0].text, i.to_string());
        assert_eq!(label.opacity, FOOTER_OPACITY);
        assert!(label.frame.x1 <= 794.0 - 45.0 + 1e-9);
    }
}

#[test]
fn geometry_stays_on_page_and_does_not_depend_on_captions() {
    let with = request(6);
    let mut without = with.clone();
    for p in &mut without.photos {
        p.caption = None;
    }
    let a = compose_all(&with, &all_ready(&with));
    let b = compose_all(&without, &all_ready(&without));
    let page = Rect::new(0.0, 0.0, 794.0, 1123.0);
    for (pa, pb) in a.iter().zip(&b) {
        let ra: Vec<Rect> = pa.photos().map(|p| p.rect).collect();
        let rb: Vec<Rect> = pb.photos().map(|p| p.rect).collect();
        assert_eq!(ra, rb);
        for r in ra {
            assert!(inside(page, r), "{r:?} off page");
        }
    }
}

#[test]
fn unresolved_photo_keeps_its_slot_as_placeholder() {
    let req = request(3);
    let mut images = all_ready(&req);
    images.insert(&req.photos[1], ResolvedImage::Unavailable);
    let pages = compose_all(&req, &images);
    let slots: Vec<&PhotoElement> = pages[1].photos().collect();
    assert_eq!(slots.len(), 2);
    assert!(slots[0].image.is_available());
    assert!(!slots[1].image.is_available());
    assert_eq!(slots[1].placeholder, JournalConfig::default().palette.placeholder);
}

#[test]
fn mismatched_plan_is_an_error() {
    let req = request(3);
    let cfg = JournalConfig::default();
    let compositor = PageCompositor::new(&cfg, &req);
    let mut bad = plan(&req.photos)[1].clone();
    bad.photo_range = 1..3;
    assert!(compositor
        .compose(&bad, &req.photos, &ResolvedImages::default())
        .is_err());

    bad.photo_range = 2..4;
    assert!(compositor
        .compose(&bad, &req.photos, &ResolvedImages::default())
        .is_err());
}
