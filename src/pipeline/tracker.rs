//! Correlation id issuance for pipeline requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::pipeline::types::CorrelationId;

/// Issues strictly increasing correlation ids.
///
/// One tracker is shared by the streaming pipeline, file translation, and
/// session handling, so the request count in status output covers every
/// utterance the process has ever accepted. Sequence numbers are never
/// reused, including across pipeline restarts.
#[derive(Debug, Default)]
pub struct RequestTracker {
    counter: AtomicU64,
}

impl RequestTracker {
    /// Creates a tracker starting at sequence 1.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Issues the next correlation id.
    ///
    /// The sequence component is unique and strictly increasing across
    /// threads. The timestamp component is wall-clock milliseconds and may
    /// repeat between ids issued in the same millisecond.
    pub fn next(&self) -> CorrelationId {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let issued_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        CorrelationId {
            sequence,
            issued_ms,
        }
    }

    /// Total ids issued so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}
