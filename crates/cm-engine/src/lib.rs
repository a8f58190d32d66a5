//! Channel remapping engine for chanmix.
//!
//! Picks a copy strategy for a pair of formats and applies it to
//! interleaved f32 blocks, in place whenever the output frame is no wider
//! than the input frame.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod allocator;
mod error;
mod mix;
mod mixer;
mod registry;
mod selector;

pub use allocator::{AllocError, BlockAllocator, HeapAllocator, LimitedAllocator};
pub use error::MixError;
pub use mix::{MixStrategy, Strides};
pub use mixer::ChannelMixer;
pub use registry::{
    AudioConverter, ConverterInfo, ConverterRegistry, ProbeFn, RegistryError, MAX_CONVERTERS,
};
pub use selector::{select, Decline};
