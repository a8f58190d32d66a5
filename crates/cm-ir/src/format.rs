//! Sample encodings and full audio format descriptors.

use core::fmt;

use crate::channel::ChannelLayout;

/// Encoding of a single sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    U8,
    S16,
    S32,
    F32,
    F64,
}

impl SampleFormat {
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S32 | SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, SampleFormat::F32 | SampleFormat::F64)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleFormat::U8 => "u8",
            SampleFormat::S16 => "s16",
            SampleFormat::S32 => "s32",
            SampleFormat::F32 => "f32",
            SampleFormat::F64 => "f64",
        })
    }
}

/// Sample encoding, rate and channel layout of one side of a converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    pub sample_format: SampleFormat,
    pub rate: u32,
    pub layout: ChannelLayout,
}

impl AudioFormat {
    pub fn new(sample_format: SampleFormat, rate: u32, layout: ChannelLayout) -> Self {
        Self {
            sample_format,
            rate,
            layout,
        }
    }

    /// Interleaved 32-bit float, the only encoding the channel mixer handles.
    pub fn float32(rate: u32, layout: ChannelLayout) -> Self {
        Self::new(SampleFormat::F32, rate, layout)
    }

    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.channel_count() * self.sample_format.bytes_per_sample()
    }

    /// Same encoding and rate with a different layout.
    pub fn with_layout(self, layout: ChannelLayout) -> Self {
        Self { layout, ..self }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} Hz {}", self.sample_format, self.rate, self.layout)
    }
}
