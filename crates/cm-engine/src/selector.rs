//! Strategy selection from a pair of audio formats.

use cm_ir::{AudioFormat, Channel, SampleFormat};
use thiserror::Error;
use tracing::debug;

use crate::mix::MixStrategy;

/// Why no channel mixer was built for a format pair.
///
/// [`Decline::IdenticalLayouts`] means there is nothing to do and the stage
/// can be skipped. Every other reason means the pair cannot be converted
/// here, and the caller should look elsewhere or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Decline {
    #[error("sample formats differ ({input} -> {output})")]
    FormatMismatch {
        input: SampleFormat,
        output: SampleFormat,
    },
    #[error("sample rates differ ({input} Hz -> {output} Hz)")]
    RateMismatch { input: u32, output: u32 },
    #[error("{0} samples are not handled")]
    UnsupportedFormat(SampleFormat),
    #[error("layout has no channels")]
    EmptyLayout,
    #[error("layouts are identical")]
    IdenticalLayouts,
    #[error("{strategy} cannot map {in_channels} channels to {out_channels}")]
    StrideMismatch {
        strategy: &'static str,
        in_channels: usize,
        out_channels: usize,
    },
    #[error("no converter is registered")]
    NoConverter,
}

/// Pick the strategy converting `input` frames into `output` frames.
///
/// Pure function of its arguments: the same pair always yields the same
/// answer.
pub fn select(input: &AudioFormat, output: &AudioFormat) -> Result<MixStrategy, Decline> {
    let decision = decide(input, output);
    match &decision {
        Ok(strategy) => debug!(
            strategy = strategy.name(),
            input = %input.layout,
            output = %output.layout,
            "selected channel mix strategy"
        ),
        Err(reason) => debug!(%reason, "channel mixer declined"),
    }
    decision
}

fn decide(input: &AudioFormat, output: &AudioFormat) -> Result<MixStrategy, Decline> {
    if input.sample_format != output.sample_format {
        return Err(Decline::FormatMismatch {
            input: input.sample_format,
            output: output.sample_format,
        });
    }
    if input.rate != output.rate {
        return Err(Decline::RateMismatch {
            input: input.rate,
            output: output.rate,
        });
    }
    if input.sample_format != SampleFormat::F32 {
        return Err(Decline::UnsupportedFormat(input.sample_format));
    }

    let (src, dst) = (&input.layout, &output.layout);
    if src == dst {
        return Err(Decline::IdenticalLayouts);
    }
    let in_channels = src.channel_count();
    let out_channels = dst.channel_count();

    let reverse_stereo = dst.reverse_stereo;
    let dual_mono_to_stereo = src.dual_mono
        && dst.physical.contains_any(&[Channel::Left, Channel::Right])
        && src.physical != dst.physical;

    let strategy = if !reverse_stereo && !dual_mono_to_stereo {
        MixStrategy::sparse(out_channels, in_channels).ok_or(Decline::EmptyLayout)?
    } else if dual_mono_to_stereo {
        // The output keeps the right-hand program unless it asks for left.
        let right = !dst.original.contains(Channel::Left);
        match (out_channels == 1, right) {
            (true, true) => MixStrategy::ExtractRight,
            (true, false) => MixStrategy::ExtractLeft,
            (false, true) => MixStrategy::CopyRight,
            (false, false) => MixStrategy::CopyLeft,
        }
    } else {
        MixStrategy::ReverseStereo
    };

    if strategy.strides() != (out_channels, in_channels) {
        return Err(Decline::StrideMismatch {
            strategy: strategy.name(),
            in_channels,
            out_channels,
        });
    }
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_ir::{ChannelLayout, ChannelSet};

    fn f32_fmt(layout: ChannelLayout) -> AudioFormat {
        AudioFormat::float32(48000, layout)
    }

    fn pick(input: ChannelLayout, output: ChannelLayout) -> Result<MixStrategy, Decline> {
        select(&f32_fmt(input), &f32_fmt(output))
    }

    #[test]
    fn identical_layouts_decline() {
        assert_eq!(
            pick(ChannelLayout::stereo(), ChannelLayout::stereo()),
            Err(Decline::IdenticalLayouts)
        );
    }

    #[test]
    fn format_and_rate_must_match() {
        let a = AudioFormat::new(SampleFormat::F32, 48000, ChannelLayout::stereo());
        let b = AudioFormat::new(SampleFormat::S16, 48000, ChannelLayout::mono());
        assert!(matches!(select(&a, &b), Err(Decline::FormatMismatch { .. })));

        let c = AudioFormat::float32(44100, ChannelLayout::mono());
        assert_eq!(
            select(&a, &c),
            Err(Decline::RateMismatch {
                input: 48000,
                output: 44100
            })
        );
    }

    #[test]
    fn only_f32_is_handled() {
        let a = AudioFormat::new(SampleFormat::S16, 48000, ChannelLayout::stereo());
        let b = AudioFormat::new(SampleFormat::S16, 48000, ChannelLayout::mono());
        assert_eq!(select(&a, &b), Err(Decline::UnsupportedFormat(SampleFormat::S16)));
    }

    #[test]
    fn plain_layout_change_uses_sparse_copy() {
        assert_eq!(
            pick(ChannelLayout::surround_5_1(), ChannelLayout::stereo()),
            Ok(MixStrategy::sparse(2, 6).unwrap())
        );
        assert_eq!(
            pick(ChannelLayout::mono(), ChannelLayout::surround_3_0()),
            Ok(MixStrategy::sparse(3, 1).unwrap())
        );
    }

    #[test]
    fn empty_layout_declines() {
        let empty = ChannelLayout::new(ChannelSet::empty());
        assert_eq!(pick(empty, ChannelLayout::stereo()), Err(Decline::EmptyLayout));
        assert_eq!(pick(ChannelLayout::stereo(), empty), Err(Decline::EmptyLayout));
    }

    #[test]
    fn original_channel_difference_alone_activates() {
        let picked = ChannelLayout::stereo()
            .with_original(ChannelSet::from_channels(&[Channel::Left]));
        assert_eq!(
            pick(ChannelLayout::stereo(), picked),
            Ok(MixStrategy::sparse(2, 2).unwrap())
        );
    }

    #[test]
    fn reverse_stereo_output_selects_swap() {
        assert_eq!(
            pick(ChannelLayout::stereo(), ChannelLayout::reverse_stereo()),
            Ok(MixStrategy::ReverseStereo)
        );
    }

    #[test]
    fn reverse_stereo_with_foreign_strides_declines() {
        let reversed_surround = ChannelLayout::surround_5_1().with_reverse_stereo(true);
        assert_eq!(
            pick(ChannelLayout::surround_5_1(), reversed_surround),
            Err(Decline::StrideMismatch {
                strategy: "reverse stereo",
                in_channels: 6,
                out_channels: 6,
            })
        );
    }

    #[test]
    fn dual_mono_to_single_speaker_extracts() {
        assert_eq!(
            pick(ChannelLayout::dual_mono(), ChannelLayout::mono_left()),
            Ok(MixStrategy::ExtractLeft)
        );
        assert_eq!(
            pick(ChannelLayout::dual_mono(), ChannelLayout::mono_right()),
            Ok(MixStrategy::ExtractRight)
        );
    }

    #[test]
    fn dual_mono_to_pair_copies_one_side() {
        let pair = ChannelSet::from_channels(&[Channel::Left, Channel::Center]);
        let left = ChannelLayout::new(pair);
        let right = ChannelLayout::new(pair)
            .with_original(ChannelSet::from_channels(&[Channel::Right]));
        assert_eq!(pick(ChannelLayout::dual_mono(), left), Ok(MixStrategy::CopyLeft));
        assert_eq!(pick(ChannelLayout::dual_mono(), right), Ok(MixStrategy::CopyRight));
    }

    #[test]
    fn dual_mono_takes_precedence_over_reverse() {
        let out = ChannelLayout::mono_left().with_reverse_stereo(true);
        assert_eq!(pick(ChannelLayout::dual_mono(), out), Ok(MixStrategy::ExtractLeft));
    }

    #[test]
    fn dual_mono_with_same_physical_set_falls_back_to_sparse() {
        let out = ChannelLayout::stereo()
            .with_original(ChannelSet::from_channels(&[Channel::Left]));
        assert_eq!(
            pick(ChannelLayout::dual_mono(), out),
            Ok(MixStrategy::sparse(2, 2).unwrap())
        );
    }

    #[test]
    fn center_only_target_is_not_a_dual_mono_case() {
        assert_eq!(
            pick(ChannelLayout::dual_mono(), ChannelLayout::mono()),
            Ok(MixStrategy::sparse(1, 2).unwrap())
        );
    }

    #[test]
    fn dual_mono_to_wider_layout_declines() {
        assert!(matches!(
            pick(ChannelLayout::dual_mono(), ChannelLayout::surround_3_0()),
            Err(Decline::StrideMismatch {
                strategy: "copy left",
                ..
            })
        ));
    }

    #[test]
    fn selection_is_repeatable() {
        let pairs = [
            (ChannelLayout::surround_7_1(), ChannelLayout::quad()),
            (ChannelLayout::dual_mono(), ChannelLayout::mono_right()),
            (ChannelLayout::stereo(), ChannelLayout::reverse_stereo()),
            (ChannelLayout::stereo(), ChannelLayout::stereo()),
        ];
        for (input, output) in pairs {
            assert_eq!(pick(input, output), pick(input, output));
        }
    }
}
