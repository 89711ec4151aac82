//! WAV decoding and encoding for pipeline ingress and egress.
//!
//! Audio arriving at the wrong sample rate is rejected, never resampled;
//! the recognition engine only accepts what it was trained on.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::error::{Result, TolmachError};
use crate::pipeline::types::AudioChunk;

/// Decodes a WAV stream into a mono audio chunk.
///
/// Validates the container against `expected_rate` and rejects layouts
/// with more than two channels. Stereo input is downmixed to mono by
/// averaging sample pairs.
pub fn decode_wav_reader<R: Read>(reader: R, expected_rate: u32) -> Result<AudioChunk> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| TolmachError::Decode {
        message: e.to_string(),
    })?;

    let spec = wav_reader.spec();
    if spec.channels == 0 || spec.channels > 2 {
        return Err(TolmachError::ChannelLayout {
            channels: spec.channels,
        });
    }
    if spec.sample_rate != expected_rate {
        return Err(TolmachError::SampleRate {
            expected: expected_rate,
            actual: spec.sample_rate,
        });
    }

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TolmachError::Decode {
            message: e.to_string(),
        })?;

    let samples = if spec.channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|pair| {
                let left = pair[0] as i32;
                let right = pair[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else {
        raw_samples
    };

    if samples.is_empty() {
        return Err(TolmachError::EmptyAudio);
    }

    Ok(AudioChunk {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decodes an in-memory WAV payload, as received over a session.
pub fn decode_wav_bytes(bytes: &[u8], expected_rate: u32) -> Result<AudioChunk> {
    decode_wav_reader(Cursor::new(bytes), expected_rate)
}

/// Reads and decodes a WAV file from disk.
pub fn read_wav_file(path: &Path, expected_rate: u32) -> Result<AudioChunk> {
    let file = File::open(path)?;
    decode_wav_reader(BufReader::new(file), expected_rate)
}

/// Encodes mono samples as an in-memory 16-bit WAV payload.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| TolmachError::Encode {
            message: e.to_string(),
        })?;
    for &sample in samples {
        writer.write_sample(sample).map_err(|e| TolmachError::Encode {
            message: e.to_string(),
        })?;
    }
    writer.finalize().map_err(|e| TolmachError::Encode {
        message: e.to_string(),
    })?;

    Ok(cursor.into_inner())
}

/// Writes mono samples to a WAV file on disk.
pub fn write_wav_file(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let bytes = encode_wav(samples, sample_rate)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
