//! Fixed sample-copy strategies.
//!
//! Each strategy owns its stride pair, so it can never be run with frame
//! sizes other than the ones it was chosen for.

use crate::error::MixError;

/// Output and input frame sizes of a [`MixStrategy::SparseCopy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Strides {
    output: usize,
    input: usize,
}

impl Strides {
    /// Both strides must be non-zero.
    pub const fn new(output: usize, input: usize) -> Option<Self> {
        if output == 0 || input == 0 {
            return None;
        }
        Some(Self { output, input })
    }

    pub const fn output(self) -> usize {
        self.output
    }

    pub const fn input(self) -> usize {
        self.input
    }
}

/// How input frames become output frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MixStrategy {
    /// Output channel `j` takes input channel `j % input`. Drops trailing
    /// channels when narrowing and replays them cyclically when widening.
    /// No summing or attenuation.
    SparseCopy(Strides),
    /// 2 -> 2: both outputs take input channel 0.
    CopyLeft,
    /// 2 -> 2: both outputs take input channel 1.
    CopyRight,
    /// 2 -> 1: keep input channel 0.
    ExtractLeft,
    /// 2 -> 1: keep input channel 1.
    ExtractRight,
    /// 2 -> 2: swap channels 0 and 1.
    ReverseStereo,
}

impl MixStrategy {
    /// Sparse copy between the given frame sizes.
    pub const fn sparse(output: usize, input: usize) -> Option<Self> {
        match Strides::new(output, input) {
            Some(strides) => Some(MixStrategy::SparseCopy(strides)),
            None => None,
        }
    }

    /// `(output, input)` channels per frame.
    pub const fn strides(self) -> (usize, usize) {
        match self {
            MixStrategy::SparseCopy(s) => (s.output, s.input),
            MixStrategy::CopyLeft | MixStrategy::CopyRight | MixStrategy::ReverseStereo => (2, 2),
            MixStrategy::ExtractLeft | MixStrategy::ExtractRight => (1, 2),
        }
    }

    /// Whether the output can be written over the input.
    ///
    /// True exactly when output frames are no wider than input frames, so a
    /// front-to-back pass never overwrites a sample it has yet to read.
    pub const fn runs_in_place(self) -> bool {
        let (output, input) = self.strides();
        output <= input
    }

    pub const fn name(self) -> &'static str {
        match self {
            MixStrategy::SparseCopy(_) => "sparse copy",
            MixStrategy::CopyLeft => "copy left",
            MixStrategy::CopyRight => "copy right",
            MixStrategy::ExtractLeft => "extract left",
            MixStrategy::ExtractRight => "extract right",
            MixStrategy::ReverseStereo => "reverse stereo",
        }
    }

    /// Convert `frames` frames from `src` into a separate `dst`.
    pub fn mix_into(self, dst: &mut [f32], src: &[f32], frames: usize) -> Result<(), MixError> {
        let (out, inp) = self.strides();
        let dst = take_mut(dst, frames, out)?;
        let src = take(src, frames, inp)?;
        let pairs = dst.chunks_exact_mut(out).zip(src.chunks_exact(inp));

        match self {
            MixStrategy::SparseCopy(_) => {
                for (d, s) in pairs {
                    for (j, sample) in d.iter_mut().enumerate() {
                        *sample = s[j % inp];
                    }
                }
            }
            MixStrategy::CopyLeft => {
                for (d, s) in pairs {
                    d[0] = s[0];
                    d[1] = s[0];
                }
            }
            MixStrategy::CopyRight => {
                for (d, s) in pairs {
                    d[0] = s[1];
                    d[1] = s[1];
                }
            }
            MixStrategy::ExtractLeft => {
                for (d, s) in pairs {
                    d[0] = s[0];
                }
            }
            MixStrategy::ExtractRight => {
                for (d, s) in pairs {
                    d[0] = s[1];
                }
            }
            MixStrategy::ReverseStereo => {
                for (d, s) in pairs {
                    d[0] = s[1];
                    d[1] = s[0];
                }
            }
        }
        Ok(())
    }

    /// Convert `frames` frames in place, compacting them towards the front
    /// of `buf`.
    ///
    /// Only valid when [`runs_in_place`](Self::runs_in_place) holds. The
    /// first `frames * output_stride` samples hold the result afterwards.
    pub fn mix_in_place(self, buf: &mut [f32], frames: usize) -> Result<(), MixError> {
        if !self.runs_in_place() {
            return Err(MixError::NotInPlace {
                strategy: self.name(),
            });
        }
        let (out, inp) = self.strides();
        let buf = take_mut(buf, frames, inp)?;

        match self {
            MixStrategy::SparseCopy(_) => {
                // out <= inp, so frame f's output starts at or before its input
                // and ends before frame f + 1's input begins.
                for f in 0..frames {
                    let src = f * inp;
                    buf.copy_within(src..src + out, f * out);
                }
            }
            MixStrategy::CopyLeft => {
                for frame in buf.chunks_exact_mut(2) {
                    frame[1] = frame[0];
                }
            }
            MixStrategy::CopyRight => {
                for frame in buf.chunks_exact_mut(2) {
                    frame[0] = frame[1];
                }
            }
            MixStrategy::ExtractLeft => {
                for f in 0..frames {
                    buf[f] = buf[2 * f];
                }
            }
            MixStrategy::ExtractRight => {
                for f in 0..frames {
                    buf[f] = buf[2 * f + 1];
                }
            }
            MixStrategy::ReverseStereo => {
                for frame in buf.chunks_exact_mut(2) {
                    let left = frame[0];
                    frame[0] = frame[1];
                    frame[1] = left;
                }
            }
        }
        Ok(())
    }
}

fn required(frames: usize, stride: usize, available: usize) -> Result<usize, MixError> {
    match frames.checked_mul(stride) {
        Some(needed) if needed <= available => Ok(needed),
        needed => Err(MixError::ShortBuffer {
            needed: needed.unwrap_or(usize::MAX),
            available,
        }),
    }
}

fn take(buf: &[f32], frames: usize, stride: usize) -> Result<&[f32], MixError> {
    let needed = required(frames, stride, buf.len())?;
    Ok(&buf[..needed])
}

fn take_mut(buf: &mut [f32], frames: usize, stride: usize) -> Result<&mut [f32], MixError> {
    let needed = required(frames, stride, buf.len())?;
    Ok(&mut buf[..needed])
}
