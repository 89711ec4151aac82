//! Audio container handling.

pub mod wav;

pub use wav::{decode_wav_bytes, decode_wav_reader, encode_wav, read_wav_file, write_wav_file};
