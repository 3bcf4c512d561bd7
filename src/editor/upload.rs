//! Image upload batch tracking.
//!
//! Dropping N files starts N uploads that finish in any order. A batch
//! counts every completion, successful or not, and reports `Finished`
//! exactly once when the last one arrives.

use std::collections::HashMap;

/// Identifier of an upload batch
pub type BatchId = u64;

#[derive(Debug, Clone, Copy)]
struct Batch {
    total: usize,
    succeeded: usize,
    failed: usize,
}

impl Batch {
    fn done(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// What a single completion did to its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadProgress {
    /// Unknown or already finished batch
    Ignored,
    /// More uploads of the batch are outstanding
    Pending { done: usize, total: usize },
    /// This was the last upload of the batch
    Finished { succeeded: usize, failed: usize },
}

/// Tracks all in-flight upload batches.
#[derive(Debug, Default)]
pub struct UploadTracker {
    next_id: BatchId,
    batches: HashMap<BatchId, Batch>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a batch of `total` uploads. Returns `None` for an empty batch.
    pub fn start(&mut self, total: usize) -> Option<BatchId> {
        if total == 0 {
            return None;
        }
        self.next_id += 1;
        self.batches.insert(
            self.next_id,
            Batch {
                total,
                succeeded: 0,
                failed: 0,
            },
        );
        Some(self.next_id)
    }

    /// Record one finished upload.
    pub fn complete(&mut self, batch: BatchId, success: bool) -> UploadProgress {
        let Some(entry) = self.batches.get_mut(&batch) else {
            return UploadProgress::Ignored;
        };

        if success {
            entry.succeeded += 1;
        } else {
            entry.failed += 1;
        }

        if entry.done() >= entry.total {
            let finished = *entry;
            self.batches.remove(&batch);
            UploadProgress::Finished {
                succeeded: finished.succeeded,
                failed: finished.failed,
            }
        } else {
            UploadProgress::Pending {
                done: entry.done(),
                total: entry.total,
            }
        }
    }

    /// Whether any batch has outstanding uploads.
    pub fn is_uploading(&self) -> bool {
        !self.batches.is_empty()
    }

    /// Completed and total uploads across open batches.
    pub fn progress(&self) -> (usize, usize) {
        self.batches
            .values()
            .fold((0, 0), |(done, total), b| (done + b.done(), total + b.total))
    }

    /// Forget all batches; late completions are then ignored.
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_is_not_started() {
        let mut tracker = UploadTracker::new();
        assert_eq!(tracker.start(0), None);
        assert!(!tracker.is_uploading());
    }

    #[test]
    fn test_batch_finishes_once_after_all_completions() {
        let mut tracker = UploadTracker::new();
        let batch = tracker.start(3).unwrap();

        assert_eq!(
            tracker.complete(batch, true),
            UploadProgress::Pending { done: 1, total: 3 }
        );
        assert_eq!(
            tracker.complete(batch, false),
            UploadProgress::Pending { done: 2, total: 3 }
        );
        assert!(tracker.is_uploading());
        assert_eq!(tracker.progress(), (2, 3));

        assert_eq!(
            tracker.complete(batch, true),
            UploadProgress::Finished {
                succeeded: 2,
                failed: 1
            }
        );
        assert!(!tracker.is_uploading());

        // Stray completion after the batch closed
        assert_eq!(tracker.complete(batch, true), UploadProgress::Ignored);
    }

    #[test]
    fn test_concurrent_batches_are_independent() {
        let mut tracker = UploadTracker::new();
        let first = tracker.start(1).unwrap();
        let second = tracker.start(2).unwrap();
        assert_ne!(first, second);

        assert!(matches!(
            tracker.complete(first, true),
            UploadProgress::Finished { .. }
        ));
        assert!(tracker.is_uploading());
        tracker.complete(second, true);
        tracker.complete(second, true);
        assert!(!tracker.is_uploading());
    }

    #[test]
    fn test_clear_ignores_late_completions() {
        let mut tracker = UploadTracker::new();
        let batch = tracker.start(2).unwrap();
        tracker.clear();
        assert_eq!(tracker.complete(batch, true), UploadProgress::Ignored);
    }
}
