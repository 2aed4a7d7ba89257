use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{PageCanvas, Rgba8};
use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// Top-level compositor configuration.
///
/// Every field has a default, so an empty JSON object is a valid config. Values can be further
/// overridden from the environment with [`JournalConfig::apply_env_overrides`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// Brand word printed on the cover and used as the filename prefix.
    pub brand: String,
    pub canvas: PageCanvas,
    pub palette: Palette,
    pub fonts: FontConfig,
    /// Optional SVG drawn instead of the brand word on the cover.
    pub brand_svg: Option<PathBuf>,
    pub fetch: FetchConfig,
    /// Decoded photos are downscaled so their longest edge is at most this many pixels.
    pub max_decode_edge: u32,
    /// JPEG quality for page rasters (1..=100).
    pub jpeg_quality: u8,
    pub threading: ThreadingConfig,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            brand: "Aura".to_string(),
            canvas: PageCanvas::default(),
            palette: Palette::default(),
            fonts: FontConfig::default(),
            brand_svg: None,
            fetch: FetchConfig::default(),
            max_decode_edge: 2400,
            jpeg_quality: 85,
            threading: ThreadingConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub paper: Rgba8,
    pub ink: Rgba8,
    pub title: Rgba8,
    pub muted: Rgba8,
    pub caption: Rgba8,
    pub quote: Rgba8,
    pub accent: Rgba8,
    /// Fill for photo slots whose image could not be resolved.
    pub placeholder: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            paper: Rgba8::rgb(0xF9, 0xF7, 0xF2),
            ink: Rgba8::rgb(0x1A, 0x1A, 0x1A),
            title: Rgba8::rgb(0x2A, 0x2A, 0x2A),
            muted: Rgba8::rgb(0x88, 0x88, 0x88),
            caption: Rgba8::rgb(0x4A, 0x4A, 0x4A),
            quote: Rgba8::rgb(0x66, 0x66, 0x66),
            accent: Rgba8::rgb(0xC1, 0x86, 0x6A),
            placeholder: Rgba8::rgb(0xE4, 0xE1, 0xDA),
        }
    }
}

/// Font files for the two typeface roles. Missing entries fall back to system fonts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    pub serif: Option<PathBuf>,
    pub sans: Option<PathBuf>,
    /// Look up system fonts when a role has no configured file.
    pub system_fallback: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            serif: None,
            sans: None,
            system_fallback: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_bytes: 40 * 1024 * 1024,
            user_agent: concat!("keepsake/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreadingConfig {
    pub parallel: bool,
    /// Worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

impl JournalConfig {
    pub fn from_json_path(path: &Path) -> KeepsakeResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> KeepsakeResult<Self> {
        let cfg: Self = serde_json::from_str(raw)
            .map_err(|e| KeepsakeError::validation(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `KEEPSAKE_*` environment overrides on top of the current values.
    pub fn apply_env_overrides(&mut self) -> KeepsakeResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> KeepsakeResult<()> {
        fn parse<T: std::str::FromStr>(key: &str, v: &str) -> KeepsakeResult<T> {
            v.trim()
                .parse::<T>()
                .map_err(|_| KeepsakeError::validation(format!("{key}: invalid value '{v}'")))
        }

        if let Some(v) = lookup("KEEPSAKE_FETCH_TIMEOUT_MS") {
            self.fetch.timeout_ms = parse("KEEPSAKE_FETCH_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("KEEPSAKE_JPEG_QUALITY") {
            self.jpeg_quality = parse("KEEPSAKE_JPEG_QUALITY", &v)?;
        }
        if let Some(v) = lookup("KEEPSAKE_THREADS") {
            self.threading.threads = Some(parse("KEEPSAKE_THREADS", &v)?);
        }
        self.validate()
    }

    pub fn validate(&self) -> KeepsakeResult<()> {
        if self.brand.trim().is_empty() {
            return Err(KeepsakeError::validation("brand must be non-empty"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(KeepsakeError::validation("jpeg_quality must be in 1..=100"));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(KeepsakeError::validation("fetch.timeout_ms must be > 0"));
        }
        if self.max_decode_edge < 16 {
            return Err(KeepsakeError::validation("max_decode_edge must be >= 16"));
        }
        if self.threading.threads == Some(0) {
            return Err(KeepsakeError::validation(
                "threading.threads must be >= 1 when set",
            ));
        }
        let (w, h) = self
            .canvas
            .pixel_size()
            .map_err(|e| KeepsakeError::validation(e.to_string()))?;
        if w > u32::from(u16::MAX) || h > u32::from(u16::MAX) {
            return Err(KeepsakeError::validation(format!(
                "canvas pixel size {w}x{h} exceeds {}",
                u16::MAX
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
