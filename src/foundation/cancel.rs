use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{KeepsakeError, KeepsakeResult};

/// Cooperative cancellation flag shared between a caller and a running pipeline.
///
/// Clones observe the same flag. The pipeline checks it before every photo fetch and before every
/// page render; buffers held by the run are released by ordinary drops when it unwinds.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> KeepsakeResult<()> {
        if self.is_cancelled() {
            Err(KeepsakeError::Cancelled)
        } else {
            Ok(())
        }
    }
}
