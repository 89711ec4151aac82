//! Default configuration constants for tolmach.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Mandatory sample rate for incoming audio, in Hz.
///
/// 16kHz is the standard for speech recognition. Chunks arriving at any other
/// rate are rejected rather than resampled, so the recognition engine always
/// sees the rate it was trained on.
pub const SAMPLE_RATE: u32 = 16000;

/// Sample rate of synthesized audio, in Hz.
///
/// The synthesis engines this service was built against emit 22.05kHz mono;
/// session responses and WAV sinks are encoded at this rate.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 22050;

/// English phrase substituted when recognition hears no speech in a session chunk.
///
/// A silent chunk still produces a full audio-plus-metadata response this way,
/// so clients can exercise the whole chain without speaking. Streaming and
/// file modes do not substitute; there the empty text is simply suppressed.
pub const FALLBACK_PHRASE: &str = "Hello, how are you?";

/// Recognized phrases suppressed before translation.
///
/// "thank you" is the trailing artifact recognition engines commonly emit when
/// the microphone picks the synthesized audio back up. Matched
/// case-insensitively against the trimmed candidate.
pub const DENYLIST: &[&str] = &["thank you", "thank you."];

/// Streaming chunk window in seconds.
///
/// Continuous input is fed to recognition in windows of this length; 2 seconds
/// matches the capture cadence the recognition engine handles best.
pub const CHUNK_SECS: f32 = 2.0;

/// Bounded wait when joining a stage worker during shutdown, in seconds.
///
/// A worker still busy after this long is detached rather than blocked on;
/// an in-flight engine call cannot be interrupted.
pub const STOP_TIMEOUT_SECS: u64 = 5;

/// Interval between periodic pipeline status log lines, in seconds.
///
/// Zero disables the monitor.
pub const MONITOR_INTERVAL_SECS: u64 = 30;

/// Default address the session server binds to.
pub const BIND_ADDR: &str = "127.0.0.1:8000";

/// Number of samples in one streaming chunk window.
pub fn chunk_samples() -> usize {
    (CHUNK_SECS * SAMPLE_RATE as f32) as usize
}

/// Default denylist as owned strings, for configuration defaults.
pub fn denylist() -> Vec<String> {
    DENYLIST.iter().map(|s| s.to_string()).collect()
}
