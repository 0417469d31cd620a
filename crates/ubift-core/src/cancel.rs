//! Cooperative cancellation for long-running scans (full-image PEB walks,
//! TNC traversal, recovery passes). Checked at LEB-granularity boundaries
//! rather than on every byte read, so the cost of a check never dominates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheap, cloneable handle that a caller can use to ask a running scan to
/// stop early (Ctrl-C from the CLI, a GUI cancel button, a timeout wrapper).
#[derive(Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that never reports cancellation; for call sites that don't
    /// need to support it (one-shot header reads, unit tests).
    pub fn never() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
