use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::fetch::{SourceFetcher, SourceLocator};
use crate::config::JournalConfig;
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::KeepsakeResult;
use crate::model::Photo;

/// Why a single photo could not be resolved. Never fatal for a run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("source is {bytes} bytes, limit is {limit}")]
    TooLarge { bytes: u64, limit: u64 },

    #[error("unsupported locator scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

/// Result of resolving one photo.
///
/// `Unavailable` is the shared sentinel: it carries no data and renders as a neutral placeholder.
#[derive(Clone, Debug)]
pub enum ResolvedImage {
    Ready(DecodedImage),
    Unavailable,
}

impl ResolvedImage {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        match self {
            Self::Ready(img) => Some(img),
            Self::Unavailable => None,
        }
    }
}

/// The process-wide "unavailable" sentinel.
pub static UNAVAILABLE: ResolvedImage = ResolvedImage::Unavailable;

/// Photo source → resolution outcome for one run.
///
/// Keyed by `image_url`, so photos sharing a source share one fetch, and photos that share an id
/// but not a source still get their own image.
#[derive(Clone, Debug, Default)]
pub struct ResolvedImages {
    by_source: HashMap<String, ResolvedImage>,
}

impl ResolvedImages {
    pub fn get(&self, photo: &Photo) -> &ResolvedImage {
        self.by_source
            .get(&photo.image_url)
            .unwrap_or(&UNAVAILABLE)
    }

    pub fn insert(&mut self, photo: &Photo, image: ResolvedImage) {
        self.by_source.insert(photo.image_url.clone(), image);
    }

    /// Number of distinct sources resolved.
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    pub fn unavailable_count(&self) -> usize {
        self.by_source.values().filter(|r| !r.is_available()).count()
    }
}

/// Fetches and decodes photo sources, one independent attempt per distinct source.
#[derive(Clone, Debug)]
pub struct ImageResolver {
    fetcher: SourceFetcher,
    max_decode_edge: u32,
}

impl ImageResolver {
    pub fn new(cfg: &JournalConfig) -> Self {
        Self {
            fetcher: SourceFetcher::new(&cfg.fetch),
            max_decode_edge: cfg.max_decode_edge,
        }
    }

    /// Resolve every photo concurrently on the current rayon pool.
    ///
    /// Individual failures (blank or unsupported locators included) become
    /// [`ResolvedImage::Unavailable`]. The only error is cancellation.
    #[tracing::instrument(skip_all, fields(photos = photos.len()))]
    pub fn resolve(&self, photos: &[Photo], cancel: &CancelToken) -> KeepsakeResult<ResolvedImages> {
        let mut seen = HashSet::with_capacity(photos.len());
        let distinct: Vec<&Photo> = photos
            .iter()
            .filter(|p| seen.insert(p.image_url.as_str()))
            .collect();

        let resolved = distinct
            .par_iter()
            .map(|photo| -> KeepsakeResult<(String, ResolvedImage)> {
                cancel.check()?;
                let image = match self.resolve_one(photo) {
                    Ok(img) => ResolvedImage::Ready(img),
                    Err(err) => {
                        tracing::warn!(photo = %photo.id, url = %photo.image_url, error = %err, "photo unavailable, using placeholder");
                        ResolvedImage::Unavailable
                    }
                };
                Ok((photo.image_url.clone(), image))
            })
            .collect::<KeepsakeResult<Vec<_>>>()?;

        let mut out = ResolvedImages::default();
        out.by_source.extend(resolved);
        tracing::debug!(
            resolved = out.len(),
            unavailable = out.unavailable_count(),
            "photo resolution finished"
        );
        Ok(out)
    }

    pub fn resolve_one(&self, photo: &Photo) -> Result<DecodedImage, ResolveError> {
        let locator = SourceLocator::parse(&photo.image_url)?;
        let bytes = self.fetcher.fetch(&locator)?;
        decode_image(&bytes, self.max_decode_edge).map_err(|e| ResolveError::Decode(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
