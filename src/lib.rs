//! tolmach - Staged English-to-Russian speech translation
//!
//! Streams 16 kHz English speech through recognition, translation, and
//! synthesis stages, producing Russian text and 22.05 kHz Russian audio.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod session;

// Core traits (recognize → translate → synthesize → play)
pub use engine::{PlaybackSink, Recognizer, StageServices, Synthesizer, Translator};

// Pipeline
pub use pipeline::{Pipeline, PipelineStatus, RequestTracker, StatusMonitor};

// Error handling
pub use error::{Result, TolmachError};

// Config
pub use config::{Config, EngineConfig, PipelineConfig, ServerConfig};

// Session server
pub use session::{AppState, serve};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
