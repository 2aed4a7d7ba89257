use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_dimensions_and_straight_alpha() {
    let decoded = decode_image(&png_bytes(3, 2, [100, 50, 200, 128]), 4096).unwrap();
    assert_eq!((decoded.width, decoded.height), (3, 2));
    assert_eq!(decoded.rgba8.get_pixel(0, 0).0, [100, 50, 200, 128]);
}

#[test]
fn decode_downscales_to_max_edge() {
    let decoded = decode_image(&png_bytes(400, 100, [1, 2, 3, 255]), 200).unwrap();
    assert_eq!((decoded.width, decoded.height), (200, 50));
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_image(b"definitely not an image", 4096).is_err());
}

#[test]
fn fit_cover_fills_exact_target() {
    let decoded = decode_image(&png_bytes(300, 100, [9, 9, 9, 255]), 4096).unwrap();
    let fitted = fit_cover(&decoded, 50, 80);
    assert_eq!(fitted.dimensions(), (50, 80));
}

#[test]
fn premultiply_matches_rounded_product() {
    let mut px = vec![100u8, 50, 200, 128, 7, 7, 7, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128,
            0,
            0,
            0,
            0
        ]
    );
}
