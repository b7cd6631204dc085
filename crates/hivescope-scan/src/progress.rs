//! Enumeration progress reporting.

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::trace;

/// Progress information during an enumeration.
#[derive(Debug, Clone, Default)]
pub struct EnumerationProgress {
    /// Child names inspected so far (including filtered ones).
    pub keys_inspected: usize,
    /// Keys retained so far.
    pub keys_retained: usize,
    /// Parent key currently being walked.
    pub current_path: String,
    /// Time elapsed since the enumeration started.
    pub elapsed: Duration,
    /// Whether this is the final update.
    pub finished: bool,
}

impl EnumerationProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspection rate in keys per second.
    pub fn keys_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.keys_inspected as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fraction of inspected keys that were retained.
    pub fn retention_ratio(&self) -> f64 {
        if self.keys_inspected == 0 {
            0.0
        } else {
            self.keys_retained as f64 / self.keys_inspected as f64
        }
    }
}

/// Feed every update from `rx` to `f` until the sender side closes.
///
/// Blocks the calling thread. Updates dropped because the receiver lagged
/// are skipped and receiving resumes with the oldest retained one.
pub fn forward_progress<F>(mut rx: broadcast::Receiver<EnumerationProgress>, mut f: F)
where
    F: FnMut(EnumerationProgress),
{
    loop {
        match rx.blocking_recv() {
            Ok(progress) => f(progress),
            Err(RecvError::Lagged(skipped)) => trace!(skipped, "progress receiver lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}
