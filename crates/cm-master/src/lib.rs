//! Headless remix controller for chanmix.
//!
//! Provides a single entry point for remixing whole recordings that the CLI
//! and tests share: slice into blocks, pick a converter, run it, collect the
//! output.

mod config;
mod wav;

use cm_engine::{AudioConverter, ChannelMixer, ConverterRegistry, LimitedAllocator};
use cm_ir::{AudioBlock, ParseLayoutError, Timestamp};
use thiserror::Error;
use tracing::{debug, info};

// Re-export common types so callers don't need cm-ir/cm-engine directly.
pub use cm_engine::{Decline, MixError};
pub use cm_formats::{FormatError, LoadedWav};
pub use cm_ir::{AudioFormat, BlockError, ChannelLayout};

pub use config::RemixConfig;

#[derive(Debug, Error)]
pub enum RemixError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Mix(#[from] MixError),
    #[error(transparent)]
    Block(#[from] BlockError),
    #[error(transparent)]
    Layout(#[from] ParseLayoutError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cannot convert {from} to {to}: {reason}")]
    Unsupported {
        from: ChannelLayout,
        to: ChannelLayout,
        reason: Decline,
    },
    #[error("layout {layout} has {actual} channels, source has {expected}")]
    LayoutCount {
        layout: ChannelLayout,
        expected: usize,
        actual: usize,
    },
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Counters for one [`Remixer::remix`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemixStats {
    /// Name of the converter that ran, `None` when the input passed through.
    pub converter: Option<&'static str>,
    pub blocks: usize,
    pub frames: usize,
    pub in_place_blocks: usize,
    pub allocated_blocks: usize,
}

impl RemixStats {
    pub fn bypassed(&self) -> bool {
        self.converter.is_none()
    }
}

/// Result of remixing one recording.
#[derive(Clone, Debug, PartialEq)]
pub struct RemixOutput {
    pub format: AudioFormat,
    /// Interleaved in chanmix channel order.
    pub samples: Vec<f32>,
    pub stats: RemixStats,
}

impl RemixOutput {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channel_count().max(1)
    }
}

/// Converts whole recordings to one target layout.
pub struct Remixer {
    config: RemixConfig,
    output_layout: ChannelLayout,
    input_layout: Option<ChannelLayout>,
    registry: ConverterRegistry,
}

impl Remixer {
    pub fn new(config: RemixConfig) -> Result<Self, RemixError> {
        let (output_layout, input_layout) = config.resolve()?;
        Ok(Self {
            config,
            output_layout,
            input_layout,
            registry: ConverterRegistry::with_builtins(),
        })
    }

    pub fn config(&self) -> &RemixConfig {
        &self.config
    }

    pub fn output_layout(&self) -> &ChannelLayout {
        &self.output_layout
    }

    /// The source format after any configured input layout override.
    pub fn source_format(&self, input: &AudioFormat) -> Result<AudioFormat, RemixError> {
        let Some(layout) = self.input_layout else {
            return Ok(*input);
        };
        if layout.channel_count() != input.channel_count() {
            return Err(RemixError::LayoutCount {
                layout,
                expected: input.channel_count(),
                actual: layout.channel_count(),
            });
        }
        Ok(input.with_layout(layout))
    }

    fn converter(
        &self,
        input: &AudioFormat,
        output: &AudioFormat,
    ) -> Result<Box<dyn AudioConverter>, Decline> {
        let Some(max) = self.config.max_block_samples else {
            return self.registry.probe(input, output);
        };
        let allocator = LimitedAllocator::new(max);
        match ChannelMixer::with_allocator(input, output, allocator) {
            Ok(mixer) => Ok(Box::new(mixer)),
            Err(reason) => {
                debug!(%reason, max, "budgeted mixer declined");
                Err(reason)
            }
        }
    }

    /// Remix interleaved `samples` described by `input`.
    ///
    /// When the layouts are identical the samples come back unchanged,
    /// tagged with the source format. Any other decline is an error.
    pub fn remix(&self, input: &AudioFormat, samples: &[f32]) -> Result<RemixOutput, RemixError> {
        let input = self.source_format(input)?;
        let channels = input.channel_count();
        if channels == 0 {
            return Err(BlockError::NoChannels.into());
        }
        if samples.len() % channels != 0 {
            return Err(BlockError::Misaligned {
                len: samples.len(),
                channels,
            }
            .into());
        }
        let frames = samples.len() / channels;
        let output = input.with_layout(self.output_layout);

        let mut converter = match self.converter(&input, &output) {
            Ok(converter) => converter,
            Err(Decline::IdenticalLayouts) => {
                info!(layout = %input.layout, "no conversion needed, passing through");
                return Ok(RemixOutput {
                    format: input,
                    samples: samples.to_vec(),
                    stats: RemixStats {
                        frames,
                        ..Default::default()
                    },
                });
            }
            Err(reason) => {
                return Err(RemixError::Unsupported {
                    from: input.layout,
                    to: output.layout,
                    reason,
                })
            }
        };

        let mut stats = RemixStats {
            converter: Some(converter.info().name),
            ..Default::default()
        };
        let mut out = Vec::with_capacity(frames * output.channel_count());
        let block_frames = self.config.block_frames;
        for (index, chunk) in samples.chunks(block_frames * channels).enumerate() {
            let start = (index * block_frames) as u64;
            let len = (chunk.len() / channels) as u64;
            let pts = Timestamp::from_frames(start, input.rate);
            let duration = Timestamp::from_frames(start + len, input.rate) - pts;
            let block = AudioBlock::from_interleaved(channels, chunk.to_vec())?
                .with_timing(pts, duration);

            let mixed = converter.process(block)?;
            if converter.runs_in_place() {
                stats.in_place_blocks += 1;
            } else {
                stats.allocated_blocks += 1;
            }
            stats.blocks += 1;
            stats.frames += mixed.frames();
            out.extend_from_slice(mixed.samples());
        }

        info!(
            converter = converter.info().name,
            from = %input.layout,
            to = %output.layout,
            blocks = stats.blocks,
            frames = stats.frames,
            "remixed"
        );
        Ok(RemixOutput {
            format: output,
            samples: out,
            stats,
        })
    }

    /// Decode a WAV file and remix its contents.
    pub fn remix_wav(&self, bytes: &[u8]) -> Result<RemixOutput, RemixError> {
        let loaded = cm_formats::load_wav(bytes)?;
        self.remix(&loaded.format, &loaded.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remixer(output: &str) -> Remixer {
        Remixer::new(RemixConfig {
            output_layout: output.into(),
            block_frames: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn downmix_keeps_leading_channels() {
        let input = AudioFormat::float32(48000, ChannelLayout::surround_3_0());
        let out = remixer("stereo")
            .remix(&input, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
            .unwrap();
        assert_eq!(out.samples, [1.0, 2.0, 4.0, 5.0, 7.0, 8.0]);
        assert_eq!(out.format.layout, ChannelLayout::stereo());
        assert_eq!(out.stats.blocks, 2);
        assert_eq!(out.stats.in_place_blocks, 2);
        assert_eq!(out.stats.frames, 3);
        assert_eq!(out.stats.converter, Some("trivial"));
    }

    #[test]
    fn identical_layout_passes_through() {
        let input = AudioFormat::float32(48000, ChannelLayout::stereo());
        let out = remixer("stereo").remix(&input, &[0.1, 0.2]).unwrap();
        assert!(out.stats.bypassed());
        assert_eq!(out.samples, [0.1, 0.2]);
        assert_eq!(out.format, input);
    }

    #[test]
    fn input_override_enables_dual_mono_extraction() {
        let remixer = Remixer::new(RemixConfig {
            output_layout: "mono-right".into(),
            input_layout: Some("dual-mono".into()),
            ..Default::default()
        })
        .unwrap();
        let input = AudioFormat::float32(48000, ChannelLayout::stereo());
        let out = remixer.remix(&input, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(out.samples, [2.0, 4.0]);
    }

    #[test]
    fn input_override_must_match_channel_count() {
        let remixer = Remixer::new(RemixConfig {
            input_layout: Some("5.1".into()),
            ..Default::default()
        })
        .unwrap();
        let input = AudioFormat::float32(48000, ChannelLayout::stereo());
        assert!(matches!(
            remixer.remix(&input, &[0.0; 4]),
            Err(RemixError::LayoutCount {
                expected: 2,
                actual: 6,
                ..
            })
        ));
    }

    #[test]
    fn budget_exhaustion_surfaces_as_mix_error() {
        let remixer = Remixer::new(RemixConfig {
            output_layout: "7.1".into(),
            max_block_samples: Some(8),
            ..Default::default()
        })
        .unwrap();
        let input = AudioFormat::float32(48000, ChannelLayout::mono());
        let err = remixer.remix(&input, &[0.0; 4]).unwrap_err();
        assert!(matches!(err, RemixError::Mix(MixError::OutOfMemory(_))));
    }

    #[test]
    fn unconvertible_pair_is_an_error() {
        let remixer = Remixer::new(RemixConfig {
            output_layout: "5.1".into(),
            input_layout: Some("dual-mono".into()),
            ..Default::default()
        })
        .unwrap();
        let input = AudioFormat::float32(48000, ChannelLayout::stereo());
        let err = remixer.remix(&input, &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            RemixError::Unsupported {
                reason: Decline::StrideMismatch {
                    in_channels: 2,
                    out_channels: 6,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn budgeted_remix_reports_declines() {
        let budgeted = |output: &str, input: Option<&str>| {
            Remixer::new(RemixConfig {
                output_layout: output.into(),
                input_layout: input.map(Into::into),
                max_block_samples: Some(1024),
                ..Default::default()
            })
            .unwrap()
        };
        let stereo = AudioFormat::float32(48000, ChannelLayout::stereo());

        let out = budgeted("stereo", None).remix(&stereo, &[0.1, 0.2]).unwrap();
        assert!(out.stats.bypassed());
        assert_eq!(out.samples, [0.1, 0.2]);

        let err = budgeted("5.1", Some("dual-mono"))
            .remix(&stereo, &[0.1, 0.2])
            .unwrap_err();
        assert!(matches!(
            err,
            RemixError::Unsupported {
                reason: Decline::StrideMismatch { .. },
                ..
            }
        ));

        let out = budgeted("mono", None).remix(&stereo, &[0.1, 0.2]).unwrap();
        assert_eq!(out.samples, [0.1]);
        assert_eq!(out.stats.converter, Some("trivial"));
    }

    #[test]
    fn misaligned_input_is_rejected() {
        let input = AudioFormat::float32(48000, ChannelLayout::stereo());
        assert!(matches!(
            remixer("mono").remix(&input, &[0.0; 3]),
            Err(RemixError::Block(BlockError::Misaligned { .. }))
        ));
    }
}
