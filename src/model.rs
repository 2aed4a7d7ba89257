use std::fmt;

use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// Opaque photo identifier supplied by the surrounding application.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PhotoId(pub String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One event photo, read-only to the compositor.
///
/// Display order is the position in the containing slice; the compositor never reorders.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    /// `http(s)://` URL, `file://` URL or filesystem path.
    #[serde(alias = "url")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Photo {
    pub fn new(id: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: PhotoId::new(id),
            image_url: image_url.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Caption with surrounding whitespace removed; blank captions count as absent.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// A single journal generation request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JournalRequest {
    pub event_name: String,
    /// Pre-formatted, human-readable date shown on the cover.
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl JournalRequest {
    /// Request-level checks only. Individual photos are never rejected here: a photo whose source
    /// is blank or unusable is resolved to a placeholder.
    pub fn validate(&self) -> KeepsakeResult<()> {
        if self.event_name.trim().is_empty() {
            return Err(KeepsakeError::validation("event_name must be non-empty"));
        }
        Ok(())
    }
}
