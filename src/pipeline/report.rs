//! Error reporting seam for stage workers.

use crate::error::TolmachError;

/// Receives per-item stage failures.
///
/// Stage workers never propagate item failures; they hand them to the
/// reporter and move on to the next queued item. Implementations must be
/// cheap and non-blocking since they run on the worker thread.
pub trait ErrorReporter: Send + Sync {
    /// Called once per failed item with the stage name and the failure.
    fn report(&self, stage: &str, error: &TolmachError);
}

/// Reporter that logs failures through `tracing`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl LogReporter {
    /// Creates a log-backed reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &TolmachError) {
        tracing::error!(stage, %error, "stage item failed, dropping");
    }
}
