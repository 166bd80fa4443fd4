//! Caller-initiated cancellation.
//!
//! Cancellation is modeled as an injected failure: when the token trips,
//! the scheduler stops issuing new part transfers and the attempt travels
//! the same fail-fast/abort path as any transfer failure. There is no
//! separate cancellation code path to keep cleanup single-sourced.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag that cancels an upload attempt.
///
/// Cloning is cheap; all clones observe the same flag. Already-dispatched
/// transfers are allowed to finish, but their results are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
