use crate::ArchiveError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Count of URLs admitted to the frontier but not yet fully processed
///
/// Incremented once per URL before it is pushed and decremented once per URL
/// after a worker finishes with it. The crawl is complete when it reads zero.
#[derive(Debug, Default)]
pub struct PendingCounter {
    count: AtomicUsize,
}

impl PendingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more outstanding URL
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Records that one outstanding URL has been fully processed
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::InvariantViolation` if the counter is already
    /// zero; the counter is left unchanged.
    pub fn decrement(&self) -> Result<(), ArchiveError> {
        self.count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| {
                ArchiveError::InvariantViolation(
                    "pending counter decremented below zero".to_string(),
                )
            })
    }

    /// Returns true iff no URL is outstanding
    pub fn is_empty(&self) -> bool {
        self.count.load(Ordering::SeqCst) == 0
    }

    pub fn value(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
