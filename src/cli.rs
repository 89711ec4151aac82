//! Command-line interface for tolmach
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Staged English-to-Russian speech translation
#[derive(Parser, Debug)]
#[command(
    name = "tolmach",
    version,
    about = "Staged English-to-Russian speech translation"
)]
pub struct Cli {
    /// Subcommand to execute (defaults to serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: stage events, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a chunk duration string.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`2s`, `500ms`), and compound (`1m30s`).
fn parse_chunk_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the realtime translation server (default)
    Serve {
        /// Listen address (default: from config, 127.0.0.1:8000)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Translate a single WAV file and print the result
    File {
        /// Input WAV file (16 kHz, mono or stereo)
        input: PathBuf,

        /// Write the synthesized Russian audio to this WAV file
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Stream a WAV file through the staged pipeline chunk by chunk
    Stream {
        /// Input WAV file (default: read from stdin)
        input: Option<PathBuf>,

        /// Write all synthesized audio to this WAV file
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Chunk duration (default: 2s). Examples: 2s, 500ms, 1m
        #[arg(long, short = 'c', value_name = "DURATION", default_value = "2s", value_parser = parse_chunk_duration)]
        chunk: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_command() {
        let cli = Cli::try_parse_from(["tolmach"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_verbose_single() {
        let cli = Cli::try_parse_from(["tolmach", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["tolmach", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_verbose_repeated_flags() {
        let cli = Cli::try_parse_from(["tolmach", "-v", "-v"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["tolmach", "--config", "/path/to/config.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_global_quiet() {
        let cli = Cli::try_parse_from(["tolmach", "--quiet", "serve"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Some(Commands::Serve { .. }) => {}
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_quiet_short_flag() {
        let cli = Cli::try_parse_from(["tolmach", "-q"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_invalid_command_returns_error() {
        let result = Cli::try_parse_from(["tolmach", "invalid"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_help_flag() {
        let result = Cli::try_parse_from(["tolmach", "--help"]);
        // Clap returns an error for --help but with DisplayHelp kind
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["tolmach", "--version"]);
        // Clap returns an error for --version but with DisplayVersion kind
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_global_options_after_command() {
        // Global options should work before or after the command
        let cli = Cli::try_parse_from(["tolmach", "serve", "--config", "/tmp/config.toml"])
            .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
    }

    // ── Serve command tests ─────────────────────────────────────────────

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["tolmach", "serve"]).unwrap();
        match cli.command {
            Some(Commands::Serve { bind }) => {
                assert!(bind.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["tolmach", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve { bind }) => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0:9000"));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    // ── File command tests ──────────────────────────────────────────────

    #[test]
    fn test_parse_file() {
        let cli = Cli::try_parse_from(["tolmach", "file", "speech.wav"]).unwrap();
        match cli.command {
            Some(Commands::File { input, output }) => {
                assert_eq!(input, PathBuf::from("speech.wav"));
                assert!(output.is_none());
            }
            _ => panic!("Expected File command"),
        }
    }

    #[test]
    fn test_parse_file_with_output() {
        let cli = Cli::try_parse_from(["tolmach", "file", "speech.wav", "-o", "out.wav"]).unwrap();
        match cli.command {
            Some(Commands::File { input, output }) => {
                assert_eq!(input, PathBuf::from("speech.wav"));
                assert_eq!(output, Some(PathBuf::from("out.wav")));
            }
            _ => panic!("Expected File command"),
        }
    }

    #[test]
    fn test_file_requires_input() {
        let result = Cli::try_parse_from(["tolmach", "file"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    // ── Stream command tests ────────────────────────────────────────────

    #[test]
    fn test_parse_stream_defaults() {
        let cli = Cli::try_parse_from(["tolmach", "stream"]).unwrap();
        match cli.command {
            Some(Commands::Stream {
                input,
                output,
                chunk,
            }) => {
                assert!(input.is_none());
                assert!(output.is_none());
                assert_eq!(chunk, Duration::from_secs(2));
            }
            _ => panic!("Expected Stream command"),
        }
    }

    #[test]
    fn test_parse_stream_with_options() {
        let cli = Cli::try_parse_from([
            "tolmach",
            "stream",
            "speech.wav",
            "--output",
            "out.wav",
            "--chunk",
            "500ms",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Stream {
                input,
                output,
                chunk,
            }) => {
                assert_eq!(input, Some(PathBuf::from("speech.wav")));
                assert_eq!(output, Some(PathBuf::from("out.wav")));
                assert_eq!(chunk, Duration::from_millis(500));
            }
            _ => panic!("Expected Stream command"),
        }
    }

    #[test]
    fn test_parse_stream_chunk_short_flag() {
        let cli = Cli::try_parse_from(["tolmach", "stream", "-c", "4s"]).unwrap();
        match cli.command {
            Some(Commands::Stream { chunk, .. }) => {
                assert_eq!(chunk, Duration::from_secs(4));
            }
            _ => panic!("Expected Stream command"),
        }
    }

    // ── Chunk duration parsing tests ────────────────────────────────────

    #[test]
    fn test_parse_chunk_duration_bare_number() {
        assert_eq!(parse_chunk_duration("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_chunk_duration("0").unwrap(), Duration::from_secs(0));
        assert_eq!(
            parse_chunk_duration("30").unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_parse_chunk_duration_with_units() {
        assert_eq!(parse_chunk_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(
            parse_chunk_duration("500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(parse_chunk_duration("1m").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_chunk_duration_compound() {
        assert_eq!(
            parse_chunk_duration("1m30s").unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            parse_chunk_duration("2s500ms").unwrap(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_parse_chunk_duration_invalid() {
        let err = parse_chunk_duration("abc").unwrap_err();
        assert!(
            err.contains("invalid") || err.contains("expected") || err.contains("unknown"),
            "Expected parse error for 'abc', got: {err}"
        );
        let err = parse_chunk_duration("2x").unwrap_err();
        assert!(
            err.contains("invalid") || err.contains("expected") || err.contains("unknown"),
            "Expected parse error for '2x', got: {err}"
        );
        let err = parse_chunk_duration("").unwrap_err();
        assert!(
            err.contains("invalid") || err.contains("expected") || err.contains("empty"),
            "Expected parse error for empty string, got: {err}"
        );
    }
}
