//! Failure modes of a running conversion.

use thiserror::Error;

use crate::allocator::AllocError;

/// Errors raised while converting a block.
///
/// Declining to convert at all is not an error; see
/// [`Decline`](crate::Decline).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MixError {
    /// A slice handed to a strategy cannot hold the requested frames.
    #[error("buffer too short: need {needed} samples, have {available}")]
    ShortBuffer { needed: usize, available: usize },

    /// An in-place run was requested from a strategy that widens frames.
    #[error("{strategy} widens frames and cannot run in place")]
    NotInPlace { strategy: &'static str },

    /// The block does not carry the channel count the converter was set up for.
    #[error("block has {actual} channels, converter expects {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Output storage for a widening conversion could not be obtained.
    #[error(transparent)]
    OutOfMemory(#[from] AllocError),
}

impl MixError {
    /// Returns `true` if the failure came from the allocator rather than
    /// from a malformed block.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, MixError::OutOfMemory(_))
    }
}
