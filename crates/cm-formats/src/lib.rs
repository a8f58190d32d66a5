//! File formats for chanmix.
//!
//! Reads RIFF/WAVE files into interleaved f32 samples laid out in chanmix
//! channel order, and writes them back as 32-bit float WAV.

mod wav_format;

pub use wav_format::{load_wav, wav_to_bytes, write_wav, LoadedWav};

use thiserror::Error;

/// Error type for format parsing and encoding.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Missing or malformed RIFF/WAVE structure
    #[error("invalid WAV header")]
    InvalidHeader,
    /// Unexpected end of file
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("unsupported sample encoding (format tag {format_tag:#06x}, {bits_per_sample} bits)")]
    Unsupported {
        format_tag: u16,
        bits_per_sample: u16,
    },
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u16),
    /// Sample count is not a whole number of frames
    #[error("{samples} samples do not divide into {channels}-channel frames")]
    Misaligned { samples: usize, channels: usize },
    /// Payload does not fit in a 32-bit RIFF size field
    #[error("{0} bytes of audio exceed the WAV size limit")]
    TooLarge(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed chunk: {0}")]
    Binrw(#[from] binrw::Error),
}
