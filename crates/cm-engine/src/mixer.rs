//! Trivial channel mixer: drops or duplicates channels block by block.

use alloc::boxed::Box;

use cm_ir::{AudioBlock, AudioFormat};
use tracing::{trace, warn};

use crate::allocator::{BlockAllocator, HeapAllocator};
use crate::error::MixError;
use crate::mix::MixStrategy;
use crate::registry::{AudioConverter, ConverterInfo};
use crate::selector::{select, Decline};

pub(crate) static INFO: ConverterInfo = ConverterInfo {
    name: "trivial",
    description: "Trivial channel mixer (drops or duplicates channels)",
    capability: "audio converter",
    priority: 1,
};

/// Remaps interleaved f32 blocks from one channel layout to another with a
/// strategy fixed at construction.
///
/// Narrowing and equal-width conversions rewrite the incoming block in
/// place. Widening conversions draw fresh storage from the allocator,
/// zero it, and hand the incoming block back to the allocator.
pub struct ChannelMixer<A = HeapAllocator> {
    input: AudioFormat,
    output: AudioFormat,
    strategy: MixStrategy,
    allocator: A,
}

impl ChannelMixer {
    pub fn new(input: &AudioFormat, output: &AudioFormat) -> Result<Self, Decline> {
        Self::with_allocator(input, output, HeapAllocator)
    }
}

impl<A: BlockAllocator> ChannelMixer<A> {
    pub fn with_allocator(
        input: &AudioFormat,
        output: &AudioFormat,
        allocator: A,
    ) -> Result<Self, Decline> {
        let strategy = select(input, output)?;
        Ok(Self {
            input: *input,
            output: *output,
            strategy,
            allocator,
        })
    }

    pub fn strategy(&self) -> MixStrategy {
        self.strategy
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Convert one block.
    ///
    /// On failure the incoming block has already been released and no
    /// output exists.
    pub fn process(&mut self, block: AudioBlock) -> Result<AudioBlock, MixError> {
        let (out_channels, in_channels) = self.strategy.strides();
        if block.channels() != in_channels {
            let actual = block.channels();
            self.allocator.release(block);
            return Err(MixError::ChannelMismatch {
                expected: in_channels,
                actual,
            });
        }

        let frames = block.frames();
        if self.strategy.runs_in_place() {
            let mut block = block;
            if let Err(err) = self.strategy.mix_in_place(block.samples_mut(), frames) {
                self.allocator.release(block);
                return Err(err);
            }
            block.shrink_channels(out_channels);
            trace!(frames, strategy = self.strategy.name(), "mixed in place");
            return Ok(block);
        }

        let storage = match self.allocator.allocate(frames * out_channels) {
            Ok(storage) => storage,
            Err(err) => {
                warn!(%err, frames, "dropping block: no storage for up-mix");
                self.allocator.release(block);
                return Err(err.into());
            }
        };
        let mut out = AudioBlock::silent_with_storage(out_channels, frames, storage);
        out.copy_timing_from(&block);

        let mixed = self
            .strategy
            .mix_into(out.samples_mut(), block.samples(), frames);
        self.allocator.release(block);
        mixed?;
        trace!(frames, strategy = self.strategy.name(), "mixed into new block");
        Ok(out)
    }
}

impl<A: BlockAllocator> AudioConverter for ChannelMixer<A> {
    fn info(&self) -> &ConverterInfo {
        &INFO
    }

    fn input_format(&self) -> &AudioFormat {
        &self.input
    }

    fn output_format(&self) -> &AudioFormat {
        &self.output
    }

    fn runs_in_place(&self) -> bool {
        self.strategy.runs_in_place()
    }

    fn process(&mut self, block: AudioBlock) -> Result<AudioBlock, MixError> {
        ChannelMixer::process(self, block)
    }
}

/// Registry probe for the trivial mixer.
pub(crate) fn probe(
    input: &AudioFormat,
    output: &AudioFormat,
) -> Result<Box<dyn AudioConverter>, Decline> {
    Ok(Box::new(ChannelMixer::new(input, output)?))
}
