//! Lazily created vector collections

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a layer's collection is known to exist.
///
/// Cleared when the collection is dropped, so the next use creates it again
/// even if an earlier re-create failed.
#[derive(Debug, Default)]
pub(super) struct CollectionState {
    ready: AtomicBool,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.ready.store(false, Ordering::Release);
    }
}
