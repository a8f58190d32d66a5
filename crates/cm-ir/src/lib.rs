//! Core types for chanmix.
//!
//! Speaker positions, channel layouts, audio formats and the interleaved
//! blocks that flow between pipeline stages. Every other crate in the
//! workspace speaks in these types.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod audio_block;
mod channel;
mod format;
mod timestamp;

pub use audio_block::{AudioBlock, BlockError, BLOCK_SIZE};
pub use channel::{Channel, ChannelLayout, ChannelSet, ParseLayoutError, CHANNEL_COUNT};
pub use format::{AudioFormat, SampleFormat};
pub use timestamp::{Timestamp, TICKS_PER_SECOND};
