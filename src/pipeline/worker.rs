//! Stage abstraction and the worker thread that drives it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select};

use crate::error::Result;
use crate::pipeline::report::ErrorReporter;

/// A processing stage in the translation pipeline.
///
/// Each stage receives input, processes it, and may produce output for the
/// next stage. Stages run in their own threads and are connected by channels.
pub trait Stage: Send + 'static {
    /// The input type this stage receives.
    type Input: Send + 'static;
    /// The output type this stage produces.
    type Output: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(Some(output))` - Successfully processed and produced output
    /// - `Ok(None)` - Successfully processed but no output (e.g., filtered)
    /// - `Err(_)` - Processing failed; the item is dropped and the worker
    ///   moves on to the next one
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>>;

    /// Returns the name of this stage for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called when the worker is shutting down.
    ///
    /// Override this to perform cleanup operations.
    fn shutdown(&mut self) {}
}

/// Runs a stage in a dedicated thread until stopped.
///
/// The worker waits on both its input channel and a stop channel. A stop
/// signal takes effect as soon as the in-flight item (if any) finishes;
/// items still queued at that point are left in the channel for the
/// orchestrator to discard.
pub struct StageWorker {
    /// Name of the stage (cached for logging).
    name: &'static str,
    /// Signals the worker thread to exit.
    stop_tx: Sender<()>,
    /// Handle to the spawned thread.
    handle: Option<JoinHandle<()>>,
}

impl StageWorker {
    /// Spawns a stage in a dedicated thread.
    ///
    /// # Arguments
    /// * `stage` - The stage implementation to run
    /// * `input_rx` - Channel to receive inputs from
    /// * `output_tx` - Channel to send outputs to, `None` for the final stage
    /// * `reporter` - Reporter for per-item failures
    pub fn spawn<S: Stage>(
        mut stage: S,
        input_rx: Receiver<S::Input>,
        output_tx: Option<Sender<S::Output>>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let name = stage.name();
        let (stop_tx, stop_rx) = bounded(1);

        let handle = thread::spawn(move || {
            run_stage(&mut stage, &input_rx, output_tx.as_ref(), &stop_rx, &*reporter);
            stage.shutdown();
        });

        Self {
            name,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Returns the name of the stage this worker runs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signals the worker to stop and waits up to `timeout` for it to exit.
    ///
    /// An in-flight engine call cannot be interrupted, so a worker still
    /// busy after the timeout is detached and dies with the process. A
    /// panicked worker thread is reported, never re-raised.
    pub fn stop(mut self, timeout: Duration) {
        self.stop_tx.send(()).ok();

        let Some(handle) = self.handle.take() else {
            return;
        };

        let deadline = Instant::now() + timeout;
        let poll_interval = Duration::from_millis(10);

        while !handle.is_finished() {
            if Instant::now() >= deadline {
                tracing::warn!(
                    stage = self.name,
                    "shutdown timeout, detaching worker thread"
                );
                // Dropping the JoinHandle detaches the thread.
                return;
            }
            thread::sleep(poll_interval);
        }

        if let Err(panic_info) = handle.join() {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            tracing::error!(stage = self.name, "worker thread panicked: {msg}");
        }
    }
}

/// Main processing loop for a stage.
fn run_stage<S: Stage>(
    stage: &mut S,
    input_rx: &Receiver<S::Input>,
    output_tx: Option<&Sender<S::Output>>,
    stop_rx: &Receiver<()>,
    reporter: &dyn ErrorReporter,
) {
    loop {
        // A pending stop beats any queued input.
        if stop_rx.try_recv().is_ok() {
            break;
        }

        select! {
            recv(stop_rx) -> _ => break,
            recv(input_rx) -> msg => {
                let Ok(input) = msg else {
                    // Upstream closed, shutdown
                    break;
                };
                match stage.process(input) {
                    Ok(Some(output)) => {
                        if let Some(tx) = output_tx
                            && tx.send(output).is_err()
                        {
                            // Downstream closed, shutdown
                            break;
                        }
                    }
                    Ok(None) => {
                        // No output produced (filtered), continue
                    }
                    Err(error) => {
                        reporter.report(stage.name(), &error);
                    }
                }
            }
        }
    }
}
