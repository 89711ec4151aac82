//! Error types for tolmach.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TolmachError {
    // Audio decode and validation errors
    #[error("Failed to decode audio: {message}")]
    Decode { message: String },

    #[error("Failed to encode audio: {message}")]
    Encode { message: String },

    #[error("Expected {expected} Hz audio, got {actual} Hz")]
    SampleRate { expected: u32, actual: u32 },

    #[error("Expected mono or stereo audio, got {channels} channels")]
    ChannelLayout { channels: u16 },

    #[error("Decoded audio is empty")]
    EmptyAudio,

    // Stage failures
    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Translation produced empty text")]
    EmptyTranslation,

    #[error("Synthesis produced empty audio")]
    EmptySynthesis,

    // Playback errors
    #[error("Playback failed: {message}")]
    Playback { message: String },

    // Pipeline lifecycle errors
    #[error("Pipeline is not running")]
    NotRunning,

    // Engine configuration errors
    #[error("No {stage} command configured: set [engines] {stage} in the config file")]
    EngineUnavailable { stage: &'static str },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TolmachError>;
