//! Subprocess-backed engine implementations.
//!
//! Each stage engine is an external command that reads its input from
//! stdin and writes its result to stdout: WAV in, text out for
//! recognition; text in, text out for translation; text in, WAV out for
//! synthesis. The `CommandRunner` trait enables full testability without
//! external binaries.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::audio::{decode_wav_bytes, encode_wav};
use crate::defaults::SYNTHESIS_SAMPLE_RATE;
use crate::error::{Result, TolmachError};
use crate::pipeline::types::AudioChunk;

use super::recognizer::Recognizer;
use super::synthesizer::Synthesizer;
use super::translator::Translator;

/// Trait for running an external command with piped stdin and stdout.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandRunner: Send + Sync {
    /// Runs a command, feeding `input` to its stdin.
    ///
    /// Returns the raw stdout of the command on success.
    /// Returns an error if the command fails to start or exits non-zero.
    fn run(&self, program: &str, args: &[String], input: &[u8]) -> Result<Vec<u8>>;
}

/// Production command runner using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], input: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from its own thread so a child that fills its stdout
        // pipe before draining stdin cannot deadlock against us.
        let writer = child.stdin.take().map(|mut stdin| {
            let payload = input.to_vec();
            thread::spawn(move || {
                // A child that ignores stdin may close it early.
                stdin.write_all(&payload).ok();
            })
        });

        let output = child.wait_with_output()?;
        if let Some(handle) = writer {
            handle.join().ok();
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TolmachError::Other(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Splits a configured command line into program and arguments.
fn split_command(command: &[String], stage: &'static str) -> Result<(String, Vec<String>)> {
    let Some((program, args)) = command.split_first() else {
        return Err(TolmachError::EngineUnavailable { stage });
    };
    Ok((program.clone(), args.to_vec()))
}

/// Recognizer that pipes WAV audio through an external command.
pub struct CommandRecognizer<R: CommandRunner = SystemRunner> {
    program: String,
    args: Vec<String>,
    runner: R,
}

impl CommandRecognizer<SystemRunner> {
    /// Creates a recognizer from a configured command line.
    pub fn new(command: &[String]) -> Result<Self> {
        Self::with_runner(command, SystemRunner::new())
    }
}

impl<R: CommandRunner> CommandRecognizer<R> {
    /// Creates a recognizer using the given runner.
    pub fn with_runner(command: &[String], runner: R) -> Result<Self> {
        let (program, args) = split_command(command, "recognize")?;
        Ok(Self {
            program,
            args,
            runner,
        })
    }
}

impl<R: CommandRunner> Recognizer for CommandRecognizer<R> {
    fn recognize(&self, chunk: &AudioChunk) -> Result<String> {
        let wav = encode_wav(&chunk.samples, chunk.sample_rate)?;
        let stdout = self
            .runner
            .run(&self.program, &self.args, &wav)
            .map_err(|e| TolmachError::Recognition {
                message: e.to_string(),
            })?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Translator that pipes text through an external command.
pub struct CommandTranslator<R: CommandRunner = SystemRunner> {
    program: String,
    args: Vec<String>,
    runner: R,
}

impl CommandTranslator<SystemRunner> {
    /// Creates a translator from a configured command line.
    pub fn new(command: &[String]) -> Result<Self> {
        Self::with_runner(command, SystemRunner::new())
    }
}

impl<R: CommandRunner> CommandTranslator<R> {
    /// Creates a translator using the given runner.
    pub fn with_runner(command: &[String], runner: R) -> Result<Self> {
        let (program, args) = split_command(command, "translate")?;
        Ok(Self {
            program,
            args,
            runner,
        })
    }
}

impl<R: CommandRunner> Translator for CommandTranslator<R> {
    fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let stdout = self
            .runner
            .run(&self.program, &self.args, text.as_bytes())
            .map_err(|e| TolmachError::Translation {
                message: e.to_string(),
            })?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Synthesizer that pipes text through an external command.
///
/// The command must emit a WAV payload at 22.05 kHz; anything else is a
/// synthesis failure.
pub struct CommandSynthesizer<R: CommandRunner = SystemRunner> {
    program: String,
    args: Vec<String>,
    runner: R,
}

impl CommandSynthesizer<SystemRunner> {
    /// Creates a synthesizer from a configured command line.
    pub fn new(command: &[String]) -> Result<Self> {
        Self::with_runner(command, SystemRunner::new())
    }
}

impl<R: CommandRunner> CommandSynthesizer<R> {
    /// Creates a synthesizer using the given runner.
    pub fn with_runner(command: &[String], runner: R) -> Result<Self> {
        let (program, args) = split_command(command, "synthesize")?;
        Ok(Self {
            program,
            args,
            runner,
        })
    }
}

impl<R: CommandRunner> Synthesizer for CommandSynthesizer<R> {
    fn synthesize(&self, text: &str) -> Result<Vec<i16>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let stdout = self
            .runner
            .run(&self.program, &self.args, text.as_bytes())
            .map_err(|e| TolmachError::Synthesis {
                message: e.to_string(),
            })?;
        let chunk =
            decode_wav_bytes(&stdout, SYNTHESIS_SAMPLE_RATE).map_err(|e| {
                TolmachError::Synthesis {
                    message: e.to_string(),
                }
            })?;
        Ok(chunk.samples)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
