use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{Result, TolmachError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engines: EngineConfig,
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub api_key: Option<String>,
}

/// Engine command lines, one per stage.
///
/// Each entry is a program followed by its arguments. The recognizer and
/// synthesizer exchange WAV bytes on stdin/stdout; the translator
/// exchanges UTF-8 text. An empty command leaves the stage unconfigured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub recognize: Vec<String>,
    pub translate: Vec<String>,
    pub synthesize: Vec<String>,
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seconds to wait for each stage worker to finish on stop.
    pub stop_timeout_secs: u64,
    /// Seconds between status log lines; 0 disables the monitor.
    pub monitor_interval_secs: u64,
    /// Utterances discarded by the text gate, matched case-insensitively.
    pub denylist: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::BIND_ADDR.to_string(),
            api_key: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stop_timeout_secs: defaults::STOP_TIMEOUT_SECS,
            monitor_interval_secs: defaults::MONITOR_INTERVAL_SECS,
            denylist: defaults::denylist(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Panics on invalid TOML so a typo never silently reverts to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(TolmachError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                panic!("Failed to load config from {}: {}", path.display(), e);
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TOLMACH_BIND → server.bind
    /// - TOLMACH_API_KEY → server.api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("TOLMACH_BIND")
            && !bind.is_empty()
        {
            self.server.bind = bind;
        }

        if let Ok(key) = std::env::var("TOLMACH_API_KEY")
            && !key.is_empty()
        {
            self.server.api_key = Some(key);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/tolmach/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tolmach")
            .join("config.toml")
    }
}
