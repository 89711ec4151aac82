//! Staged translation pipeline.
//!
//! Implements a three-stage pipeline where each stage runs in its own
//! thread, connected by crossbeam channels. Items that fail a stage are
//! logged and dropped; the workers keep running until stopped.

pub mod gate;
pub mod monitor;
pub mod orchestrator;
pub mod report;
pub mod stages;
pub mod tracker;
pub mod types;
pub mod worker;

pub use monitor::StatusMonitor;
pub use orchestrator::Pipeline;
pub use report::{ErrorReporter, LogReporter};
pub use stages::{RecognitionStage, SynthesisStage, TranslationStage};
pub use tracker::RequestTracker;
pub use types::{AudioChunk, ChunkOutcome, CorrelationId, FileOutcome, PipelineStatus, StageMessage};
pub use worker::{Stage, StageWorker};
