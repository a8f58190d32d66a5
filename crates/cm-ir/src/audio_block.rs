//! Interleaved f32 audio block with timing metadata.

use alloc::vec;
use alloc::vec::Vec;
use core::mem::size_of;
use core::slice::ChunksExact;

use crate::timestamp::Timestamp;

/// Default number of frames per block.
pub const BLOCK_SIZE: usize = 1024;

/// Error returned when raw samples cannot form a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("a block needs at least one channel")]
    NoChannels,
    #[error("{len} samples do not divide into frames of {channels} channels")]
    Misaligned { len: usize, channels: usize },
}

/// A run of interleaved f32 frames owned by one pipeline stage at a time.
///
/// `samples[frame * channels + ch]` is the sample for channel `ch` at
/// `frame`. The sample count is always an exact multiple of the channel
/// count; constructors reject anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBlock {
    samples: Vec<f32>,
    channels: usize,
    nb_frames: usize,
    /// Decode timestamp.
    pub dts: Timestamp,
    /// Presentation timestamp.
    pub pts: Timestamp,
    pub duration: Timestamp,
}

impl AudioBlock {
    /// Create a silent block with the given dimensions.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            samples: vec![0.0; channels * frames],
            channels,
            nb_frames: frames,
            dts: Timestamp::INVALID,
            pts: Timestamp::INVALID,
            duration: Timestamp::INVALID,
        }
    }

    /// Wrap interleaved samples.
    pub fn from_interleaved(channels: usize, samples: Vec<f32>) -> Result<Self, BlockError> {
        if channels == 0 {
            return Err(BlockError::NoChannels);
        }
        if samples.len() % channels != 0 {
            return Err(BlockError::Misaligned {
                len: samples.len(),
                channels,
            });
        }
        Ok(Self {
            nb_frames: samples.len() / channels,
            samples,
            channels,
            dts: Timestamp::INVALID,
            pts: Timestamp::INVALID,
            duration: Timestamp::INVALID,
        })
    }

    /// Build a silent block on top of existing storage.
    ///
    /// Whatever `storage` held is discarded; every sample of the result is
    /// zero. Capacity already reserved in `storage` is reused.
    pub fn silent_with_storage(channels: usize, frames: usize, mut storage: Vec<f32>) -> Self {
        storage.clear();
        storage.resize(channels * frames, 0.0);
        Self {
            samples: storage,
            channels,
            nb_frames: frames,
            dts: Timestamp::INVALID,
            pts: Timestamp::INVALID,
            duration: Timestamp::INVALID,
        }
    }

    /// Set presentation and decode time to `pts`, and the duration.
    pub fn with_timing(mut self, pts: Timestamp, duration: Timestamp) -> Self {
        self.pts = pts;
        self.dts = pts;
        self.duration = duration;
        self
    }

    /// Samples per frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.nb_frames
    }

    pub fn is_empty(&self) -> bool {
        self.nb_frames == 0
    }

    /// Logical payload length in bytes.
    pub fn byte_len(&self) -> usize {
        self.samples.len() * size_of::<f32>()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Read-only access to one frame.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.channels)?;
        self.samples.get(start..start + self.channels)
    }

    pub fn iter_frames(&self) -> ChunksExact<'_, f32> {
        self.samples.chunks_exact(self.channels.max(1))
    }

    /// Copy frame count and timing from another block.
    pub fn copy_timing_from(&mut self, other: &AudioBlock) {
        self.nb_frames = other.nb_frames;
        self.dts = other.dts;
        self.pts = other.pts;
        self.duration = other.duration;
    }

    /// Reinterpret the block with a narrower frame after its samples have
    /// been compacted in place.
    ///
    /// Keeps the first `frames * channels` samples; the storage is not
    /// reallocated. Widening is not possible in place and leaves the block
    /// untouched.
    pub fn shrink_channels(&mut self, channels: usize) {
        if channels == 0 || channels > self.channels {
            return;
        }
        self.samples.truncate(self.nb_frames * channels);
        self.channels = channels;
    }
}
