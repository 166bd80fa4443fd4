//! Whole-file progress aggregation across parallel part transfers.
//!
//! Each in-flight part reports a cumulative "bytes sent so far" count for
//! its own slot. The aggregate percentage is the sum over all slots divided
//! by the file size. Per-slot counts are clamped monotone, and the emitted
//! percentage is additionally clamped non-decreasing, so concurrent
//! reporters can never make the whole-file number go backwards.

use std::sync::Arc;

use parking_lot::Mutex;

/// Callback receiving the whole-file progress percentage (0..=100).
///
/// Invoked from whichever worker happens to report progress; implementations
/// must be cheap and thread-safe.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Per-attempt progress state.
///
/// Created when an attempt starts uploading and discarded at its terminal
/// state. All mutation happens under one lock; the arithmetic is trivial,
/// so contention is dominated by the transfers themselves.
#[derive(Debug)]
pub struct ProgressState {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Bytes sent so far, indexed by slot (part number - 1).
    sent: Vec<u64>,
    /// Total file size in bytes. Non-zero.
    total_bytes: u64,
    /// Highest percentage handed out so far.
    last_percent: f64,
}

impl ProgressState {
    /// Create progress state for `slots` parallel transfers of a
    /// `total_bytes`-sized file.
    #[must_use]
    pub fn new(total_bytes: u64, slots: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sent: vec![0; slots],
                total_bytes: total_bytes.max(1),
                last_percent: 0.0,
            }),
        }
    }

    /// Record a cumulative byte count for one slot and return the aggregate
    /// percentage.
    ///
    /// Stale reports (a count lower than one already recorded for the slot)
    /// are ignored, keeping each slot monotone; the returned percentage is
    /// clamped so it never decreases across calls from any slot.
    pub fn record(&self, slot: usize, bytes_sent: u64) -> f64 {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.sent.get_mut(slot) {
            *entry = (*entry).max(bytes_sent);
        }

        let sent: u64 = inner.sent.iter().sum();
        let percent = (sent as f64 / inner.total_bytes as f64 * 100.0).min(100.0);
        inner.last_percent = inner.last_percent.max(percent);
        inner.last_percent
    }

    /// The current aggregate percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.inner.lock().last_percent
    }

    /// Total bytes recorded as sent across all slots.
    #[must_use]
    pub fn bytes_sent(&self) -> u64 {
        self.inner.lock().sent.iter().sum()
    }
}
