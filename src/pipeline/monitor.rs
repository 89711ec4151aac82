//! Periodic pipeline status logging.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::pipeline::orchestrator::Pipeline;

/// Logs a status line at a fixed interval until stopped.
pub struct StatusMonitor {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl StatusMonitor {
    /// Spawns the monitor thread.
    pub fn spawn(pipeline: Arc<Pipeline>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded(1);
        let ticker = tick(interval);

        let handle = thread::spawn(move || {
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        let status = pipeline.status();
                        tracing::info!(
                            running = status.running,
                            recognition_queue = status.recognition_queue,
                            translation_queue = status.translation_queue,
                            synthesis_queue = status.synthesis_queue,
                            requests = status.requests,
                            "pipeline status"
                        );
                    }
                }
            }
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stops the monitor and waits for its thread.
    pub fn stop(mut self) {
        self.stop_tx.send(()).ok();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}
