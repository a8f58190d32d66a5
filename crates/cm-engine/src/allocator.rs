//! Storage provider for widening conversions.

use alloc::vec::Vec;

use cm_ir::AudioBlock;
use thiserror::Error;
use tracing::warn;

/// The allocator could not provide the requested storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to allocate {requested} samples")]
pub struct AllocError {
    pub requested: usize,
}

/// Supplies sample storage when a conversion has to grow a block, and takes
/// back blocks that are no longer needed.
pub trait BlockAllocator: Send {
    /// Storage with room for at least `samples` values.
    ///
    /// The returned vector's contents are unspecified; callers zero-fill it.
    /// A request for zero samples must succeed.
    fn allocate(&mut self, samples: usize) -> Result<Vec<f32>, AllocError>;

    /// Give back a block the caller is done with.
    fn release(&mut self, block: AudioBlock) {
        drop(block);
    }
}

/// Allocates from the global heap, reporting failure instead of aborting.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl BlockAllocator for HeapAllocator {
    fn allocate(&mut self, samples: usize) -> Result<Vec<f32>, AllocError> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(samples)
            .map_err(|_| AllocError { requested: samples })?;
        Ok(storage)
    }
}

/// Caps the size of any single request, forwarding the rest to `inner`.
#[derive(Clone, Debug)]
pub struct LimitedAllocator<A = HeapAllocator> {
    inner: A,
    max_samples: usize,
}

impl LimitedAllocator {
    pub fn new(max_samples: usize) -> Self {
        Self::wrap(HeapAllocator, max_samples)
    }
}

impl<A> LimitedAllocator<A> {
    pub fn wrap(inner: A, max_samples: usize) -> Self {
        Self { inner, max_samples }
    }
}

impl<A: BlockAllocator> BlockAllocator for LimitedAllocator<A> {
    fn allocate(&mut self, samples: usize) -> Result<Vec<f32>, AllocError> {
        if samples > self.max_samples {
            warn!(
                requested = samples,
                limit = self.max_samples,
                "allocation over budget"
            );
            return Err(AllocError { requested: samples });
        }
        self.inner.allocate(samples)
    }

    fn release(&mut self, block: AudioBlock) {
        self.inner.release(block);
    }
}
