use super::*;
use serde_json::json;

#[test]
fn default_canvas_captures_at_twice_a4_96dpi() {
    let canvas = PageCanvas::default();
    assert_eq!(canvas.pixel_size().unwrap(), (1588, 2246));
    assert_eq!(canvas.bounds(), Rect::new(0.0, 0.0, 794.0, 1123.0));
}

#[test]
fn degenerate_canvas_is_an_environment_error() {
    let canvas = PageCanvas {
        width: 0.0,
        height: 10.0,
        scale: 2.0,
    };
    assert!(matches!(
        canvas.pixel_size(),
        Err(KeepsakeError::Environment(_))
    ));
}

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Rgba8 = serde_json::from_value(json!("#F9F7F2")).unwrap();
    assert_eq!(c, Rgba8::rgb(0xF9, 0xF7, 0xF2));

    let c: Rgba8 = serde_json::from_value(json!("0000ff80")).unwrap();
    assert_eq!(c, Rgba8::rgba(0, 0, 255, 128));

    assert!(serde_json::from_value::<Rgba8>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Rgba8>(json!("#zz0000")).is_err());
}

#[test]
fn parses_byte_arrays() {
    let c: Rgba8 = serde_json::from_value(json!([1, 2, 3])).unwrap();
    assert_eq!(c, Rgba8::rgb(1, 2, 3));
    let c: Rgba8 = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Rgba8::rgba(1, 2, 3, 4));
    assert!(serde_json::from_value::<Rgba8>(json!([1, 2])).is_err());
}

#[test]
fn premultiply_and_opacity() {
    assert_eq!(Rgba8::rgb(10, 20, 30).premultiplied(), [10, 20, 30, 255]);
    assert_eq!(Rgba8::rgba(255, 0, 0, 0).premultiplied(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::rgb(26, 26, 26).with_opacity(0.6).a, 153);
}
