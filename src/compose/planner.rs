use std::ops::Range;

use crate::model::{Photo, PhotoId};

/// The four page archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayoutKind {
    Cover,
    /// Large primary photo with a pinned overlay photo.
    LayoutA,
    /// Full-height left column plus two stacked photos.
    LayoutB,
    /// One framed photo with an optional quotation.
    LayoutC,
}

impl LayoutKind {
    /// Number of photo slots on a page of this kind.
    pub const fn slots(self) -> usize {
        match self {
            Self::Cover => 0,
            Self::LayoutA => 2,
            Self::LayoutB => 3,
            Self::LayoutC => 1,
        }
    }

    /// Content layout whose slot count is `batch`.
    fn for_batch(batch: usize) -> Self {
        match batch {
            2 => Self::LayoutA,
            3 => Self::LayoutB,
            _ => Self::LayoutC,
        }
    }
}

/// Repeating content rhythm: A, B, C, A, B, C, ...
pub const LAYOUT_PATTERN: [LayoutKind; 3] =
    [LayoutKind::LayoutA, LayoutKind::LayoutB, LayoutKind::LayoutC];

/// One output page: its position, archetype and the photos assigned to it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PagePlan {
    /// 0 is the cover, content pages are 1..=N.
    pub index: usize,
    pub kind: LayoutKind,
    /// Contiguous range into the input photo slice.
    pub photo_range: Range<usize>,
    pub photo_ids: Vec<PhotoId>,
}

impl PagePlan {
    pub fn is_cover(&self) -> bool {
        self.kind == LayoutKind::Cover
    }

    /// Number shown in the footer; `None` for the cover.
    pub fn page_number(&self) -> Option<u32> {
        if self.is_cover() {
            None
        } else {
            u32::try_from(self.index).ok()
        }
    }

    pub fn photos<'a>(&self, photos: &'a [Photo]) -> &'a [Photo] {
        &photos[self.photo_range.clone()]
    }
}

/// Split `photos` into the cover plus content pages following [`LAYOUT_PATTERN`].
///
/// When fewer photos remain than the pattern's turn asks for, exactly two remaining photos form a
/// `LayoutA` page and any other remainder is emitted one `LayoutC` page at a time. The pattern
/// position advances once per emitted page, fallback or not.
pub fn plan(photos: &[Photo]) -> Vec<PagePlan> {
    let mut pages = Vec::with_capacity(1 + photos.len() / 2);
    pages.push(PagePlan {
        index: 0,
        kind: LayoutKind::Cover,
        photo_range: 0..0,
        photo_ids: Vec::new(),
    });

    let mut current = 0usize;
    let mut pattern_idx = 0usize;
    while current < photos.len() {
        let nominal = LAYOUT_PATTERN[pattern_idx % LAYOUT_PATTERN.len()].slots();
        let remaining = photos.len() - current;
        let batch = if remaining < nominal {
            if remaining == 2 { 2 } else { 1 }
        } else {
            nominal
        };

        let range = current..current + batch;
        pages.push(PagePlan {
            index: pages.len(),
            kind: LayoutKind::for_batch(batch),
            photo_ids: photos[range.clone()].iter().map(|p| p.id.clone()).collect(),
            photo_range: range,
        });

        current += batch;
        pattern_idx += 1;
    }

    tracing::debug!(
        photos = photos.len(),
        content_pages = pages.len() - 1,
        "pagination planned"
    );
    pages
}

/// Content pages only (drops the cover).
pub fn content_pages(plans: &[PagePlan]) -> &[PagePlan] {
    match plans.first() {
        Some(p) if p.is_cover() => &plans[1..],
        _ => plans,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/planner.rs"]
mod tests;
