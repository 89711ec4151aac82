//! Pipeline orchestrator: owns the stage workers and their queues.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::audio::read_wav_file;
use crate::config::PipelineConfig;
use crate::defaults;
use crate::engine::{PlaybackSink, StageServices};
use crate::error::{Result, TolmachError};
use crate::pipeline::report::{ErrorReporter, LogReporter};
use crate::pipeline::stages::{RecognitionStage, SynthesisStage, TranslationStage};
use crate::pipeline::tracker::RequestTracker;
use crate::pipeline::types::{AudioChunk, ChunkOutcome, FileOutcome, PipelineStatus, StageMessage};
use crate::pipeline::worker::StageWorker;

/// Channels and workers of a running pipeline.
///
/// The orchestrator keeps its own receiver handles so it can read queue
/// depths without disturbing the workers, and drain leftovers once the
/// workers have stopped.
struct RunningState {
    audio_tx: Sender<AudioChunk>,
    audio_rx: Receiver<AudioChunk>,
    accepted_rx: Receiver<StageMessage<String>>,
    russian_rx: Receiver<StageMessage<String>>,
    workers: Vec<StageWorker>,
}

/// Staged translation pipeline: recognition → translation → synthesis.
///
/// Holds the engines and the request tracker for the lifetime of the
/// process; the stage workers and queues exist only between `start` and
/// `stop`. All methods take `&self`, so one pipeline can be shared across
/// the server, the status monitor, and signal handling.
pub struct Pipeline {
    services: StageServices,
    config: PipelineConfig,
    reporter: Arc<dyn ErrorReporter>,
    tracker: Arc<RequestTracker>,
    state: Mutex<Option<RunningState>>,
}

impl Pipeline {
    /// Creates a stopped pipeline with the default error reporter.
    pub fn new(services: StageServices, config: PipelineConfig) -> Self {
        Self {
            services,
            config,
            reporter: Arc::new(LogReporter),
            tracker: Arc::new(RequestTracker::new()),
            state: Mutex::new(None),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Starts the stage workers.
    ///
    /// Starting an already running pipeline logs a warning and changes
    /// nothing. The playback sink moves into the synthesis stage and is
    /// finished when the pipeline stops.
    pub fn start(&self, playback: Box<dyn PlaybackSink>) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if guard.is_some() {
            tracing::warn!("pipeline already running, start ignored");
            return Ok(());
        }

        let (audio_tx, audio_rx) = unbounded();
        let (accepted_tx, accepted_rx) = unbounded();
        let (russian_tx, russian_rx) = unbounded();

        let recognition = RecognitionStage::new(
            self.services.recognizer.clone(),
            self.tracker.clone(),
            self.config.denylist.clone(),
        );
        let translation = TranslationStage::new(self.services.translator.clone());
        let synthesis = SynthesisStage::new(self.services.synthesizer.clone(), playback);

        // Workers are stored in stage order; stop() relies on it.
        let workers = vec![
            StageWorker::spawn(
                recognition,
                audio_rx.clone(),
                Some(accepted_tx),
                self.reporter.clone(),
            ),
            StageWorker::spawn(
                translation,
                accepted_rx.clone(),
                Some(russian_tx),
                self.reporter.clone(),
            ),
            StageWorker::spawn(synthesis, russian_rx.clone(), None, self.reporter.clone()),
        ];

        *guard = Some(RunningState {
            audio_tx,
            audio_rx,
            accepted_rx,
            russian_rx,
            workers,
        });

        tracing::info!("pipeline started");
        Ok(())
    }

    /// Stops the stage workers and discards queued items.
    ///
    /// Workers are stopped in stage order, each with a bounded wait.
    /// Stopping an already stopped pipeline logs a warning and changes
    /// nothing.
    pub fn stop(&self) {
        let state = {
            let mut guard = self
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.take()
        };

        let Some(state) = state else {
            tracing::warn!("pipeline already stopped, stop ignored");
            return;
        };

        let timeout = Duration::from_secs(self.config.stop_timeout_secs);
        for worker in state.workers {
            worker.stop(timeout);
        }

        let discarded = drain(&state.audio_rx) + drain(&state.accepted_rx) + drain(&state.russian_rx);
        if discarded > 0 {
            tracing::info!(discarded, "discarded queued items on shutdown");
        }

        tracing::info!("pipeline stopped");
    }

    /// Queues an audio chunk for the recognition stage.
    pub fn submit_audio(&self, chunk: AudioChunk) -> Result<()> {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(state) = guard.as_ref() else {
            return Err(TolmachError::NotRunning);
        };
        state
            .audio_tx
            .send(chunk)
            .map_err(|_| TolmachError::NotRunning)
    }

    /// Snapshot of queue depths and the cumulative request count.
    ///
    /// Never blocks on pipeline work; safe to call from monitoring paths.
    pub fn status(&self) -> PipelineStatus {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match guard.as_ref() {
            Some(state) => PipelineStatus {
                running: true,
                recognition_queue: state.audio_rx.len(),
                translation_queue: state.accepted_rx.len(),
                synthesis_queue: state.russian_rx.len(),
                requests: self.tracker.issued(),
            },
            None => PipelineStatus {
                running: false,
                recognition_queue: 0,
                translation_queue: 0,
                synthesis_queue: 0,
                requests: self.tracker.issued(),
            },
        }
    }

    /// Whether the stage workers are currently running.
    pub fn is_running(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Pushes one chunk through all three stages synchronously.
    ///
    /// Bypasses the queues and the text gate; empty recognition flows
    /// through as an empty outcome. Works whether or not the stage
    /// workers are running.
    pub fn process_chunk(&self, chunk: &AudioChunk) -> Result<ChunkOutcome> {
        let id = self.tracker.next();

        let english = self.services.recognizer.recognize(chunk)?.trim().to_string();
        let russian = self.services.translator.translate(&english)?;
        let samples = self.services.synthesizer.synthesize(&russian)?;

        tracing::info!(
            %id,
            english = %english,
            russian = %russian,
            samples = samples.len(),
            "processed chunk"
        );

        Ok(ChunkOutcome {
            id,
            english_text: english,
            russian_text: russian,
            samples,
        })
    }

    /// Translates a whole 16 kHz WAV file synchronously.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let chunk = read_wav_file(path, defaults::SAMPLE_RATE)?;
        let outcome = self.process_chunk(&chunk)?;

        Ok(FileOutcome {
            english_text: outcome.english_text,
            russian_text: outcome.russian_text,
            audio_sample_count: outcome.samples.len(),
        })
    }

    /// Shared request tracker, also used by session handling.
    pub fn tracker(&self) -> Arc<RequestTracker> {
        self.tracker.clone()
    }

    /// The engine handles this pipeline was built with.
    pub fn services(&self) -> &StageServices {
        &self.services
    }
}

fn drain<T>(rx: &Receiver<T>) -> usize {
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    count
}
