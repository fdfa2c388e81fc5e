//! Upload progress tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Converts bytes sent into a whole percentage.
///
/// A zero-byte upload counts as complete.
pub fn upload_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = sent.min(total) as f64;
    ((sent * 100.0) / total as f64).round() as u8
}

/// Shared byte counters for an in-flight upload.
///
/// Cloning is cheap; every clone observes the same counters, so the
/// transfer side can record progress while the owner reads it.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    total: AtomicU64,
    active: AtomicBool,
}

impl ProgressTracker {
    /// Creates an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a transfer of `total` bytes.
    pub fn start(&self, total: u64) {
        self.inner.total.store(total, Ordering::SeqCst);
        self.inner.sent.store(0, Ordering::SeqCst);
        self.inner.active.store(true, Ordering::SeqCst);
    }

    /// Records the number of bytes sent so far.
    pub fn record(&self, sent: u64, total: u64) {
        self.inner.total.store(total, Ordering::SeqCst);
        self.inner.sent.store(sent, Ordering::SeqCst);
    }

    /// Clears the tracker.
    pub fn clear(&self) {
        self.inner.active.store(false, Ordering::SeqCst);
        self.inner.sent.store(0, Ordering::SeqCst);
        self.inner.total.store(0, Ordering::SeqCst);
    }

    /// Returns the current percentage, or `None` when no upload is active.
    pub fn percent(&self) -> Option<u8> {
        if !self.inner.active.load(Ordering::SeqCst) {
            return None;
        }
        Some(upload_percent(
            self.inner.sent.load(Ordering::SeqCst),
            self.inner.total.load(Ordering::SeqCst),
        ))
    }
}
