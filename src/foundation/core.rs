use crate::foundation::error::{KeepsakeError, KeepsakeResult};

pub use kurbo::{Affine, Rect};

/// Logical page width (A4 at 96 dpi).
pub const PAGE_WIDTH: f64 = 794.0;
/// Logical page height (A4 at 96 dpi).
pub const PAGE_HEIGHT: f64 = 1123.0;
/// Device-scale factor applied when rasterizing.
pub const DEVICE_SCALE: f64 = 2.0;

/// Logical page dimensions plus the device scale used for capture.
///
/// Every page in a journal shares one canvas; the compositor works in logical units and the
/// rasterizer multiplies by `scale`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageCanvas {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
    /// Device pixels per logical unit.
    pub scale: f64,
}

impl Default for PageCanvas {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            scale: DEVICE_SCALE,
        }
    }
}

impl PageCanvas {
    /// Full-page rectangle in logical units.
    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Device pixel size `(width, height)` of a captured page.
    pub fn pixel_size(self) -> KeepsakeResult<(u32, u32)> {
        let w = (self.width * self.scale).round();
        let h = (self.height * self.scale).round();
        if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 {
            return Err(KeepsakeError::environment(format!(
                "invalid page canvas {}x{} @{}x",
                self.width, self.height, self.scale
            )));
        }
        Ok((w as u32, h as u32))
    }
}

/// Straight-alpha RGBA8 color.
///
/// Deserializes from `"#RRGGBB"`, `"#RRGGBBAA"` or a `[r, g, b]` / `[r, g, b, a]` byte array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `opacity` (0..=1).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn parse_hex(s: &str) -> KeepsakeResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> KeepsakeResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| KeepsakeError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(KeepsakeError::validation("hex color must be ascii"));
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::rgba(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err(KeepsakeError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// Premultiplied `[r, g, b, a]` bytes.
    pub fn premultiplied(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
