//! WAV encoding and decoding.
//!
//! Files store channels in WAVE speaker-mask order; chanmix blocks store them
//! in [`Channel`] order. Loading and writing permute each frame between the
//! two.

use std::io::{Cursor, Write};

use arrayvec::ArrayVec;
use binrw::{BinRead, BinWrite};
use cm_ir::{AudioFormat, Channel, ChannelLayout, ChannelSet, CHANNEL_COUNT};
use tracing::{debug, trace, warn};

use crate::FormatError;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Bytes 2..16 of every `KSDATAFORMAT_SUBTYPE_*` GUID derived from a format tag.
const SUBTYPE_GUID_TAIL: [u8; 14] = [
    0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

/// WAVE speaker bits in file order, paired with the position they map to.
/// Front left/right-of-center (0x40, 0x80) have no counterpart.
const SPEAKERS: [(u32, Channel); CHANNEL_COUNT] = [
    (0x001, Channel::Left),
    (0x002, Channel::Right),
    (0x004, Channel::Center),
    (0x008, Channel::Lfe),
    (0x010, Channel::RearLeft),
    (0x020, Channel::RearRight),
    (0x100, Channel::RearCenter),
    (0x200, Channel::MiddleLeft),
    (0x400, Channel::MiddleRight),
];

#[derive(BinRead, BinWrite, Debug)]
#[brw(little, magic = b"RIFF")]
struct RiffHeader {
    size: u32,
    form: [u8; 4],
}

#[derive(BinRead, BinWrite, Debug)]
#[brw(little)]
struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

#[derive(BinRead, BinWrite, Debug, Clone, Copy)]
#[brw(little)]
struct FmtChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

/// Trailer of a `WAVE_FORMAT_EXTENSIBLE` fmt chunk.
#[derive(BinRead, BinWrite, Debug, Clone, Copy)]
#[brw(little)]
struct FmtExtension {
    cb_size: u16,
    valid_bits_per_sample: u16,
    channel_mask: u32,
    sub_format_tag: u16,
    sub_format_tail: [u8; 14],
}

// --- Writing ---

/// Write interleaved samples as a 32-bit IEEE float WAV file.
///
/// Layouts other than the default for their channel count are written as
/// `WAVE_FORMAT_EXTENSIBLE` with a speaker mask so they survive a reload.
pub fn write_wav(
    w: &mut impl Write,
    format: &AudioFormat,
    samples: &[f32],
) -> Result<(), FormatError> {
    let set = format.layout.physical;
    let channels = set.len();
    if channels == 0 {
        return Err(FormatError::UnsupportedChannels(0));
    }
    if samples.len() % channels != 0 {
        return Err(FormatError::Misaligned {
            samples: samples.len(),
            channels,
        });
    }

    let extensible = ChannelLayout::from_count(channels).map(|l| l.physical) != Some(set);
    let fmt_size: u32 = if extensible { 40 } else { 16 };
    let data_bytes = samples.len() * 4;
    let data_size = u32::try_from(data_bytes)
        .ok()
        .filter(|size| size.checked_add(4 + 8 + fmt_size + 8).is_some())
        .ok_or(FormatError::TooLarge(data_bytes))?;

    let block_align = channels as u16 * 4;
    let mut head = Cursor::new(Vec::with_capacity(68));
    RiffHeader {
        size: 4 + 8 + fmt_size + 8 + data_size,
        form: *b"WAVE",
    }
    .write(&mut head)?;
    ChunkHeader {
        id: *b"fmt ",
        size: fmt_size,
    }
    .write(&mut head)?;
    FmtChunk {
        format_tag: if extensible {
            FORMAT_EXTENSIBLE
        } else {
            FORMAT_IEEE_FLOAT
        },
        channels: channels as u16,
        sample_rate: format.rate,
        byte_rate: format.rate.saturating_mul(block_align as u32),
        block_align,
        bits_per_sample: 32,
    }
    .write(&mut head)?;
    if extensible {
        FmtExtension {
            cb_size: 22,
            valid_bits_per_sample: 32,
            channel_mask: speaker_mask(&set),
            sub_format_tag: FORMAT_IEEE_FLOAT,
            sub_format_tail: SUBTYPE_GUID_TAIL,
        }
        .write(&mut head)?;
    }
    ChunkHeader {
        id: *b"data",
        size: data_size,
    }
    .write(&mut head)?;
    w.write_all(head.get_ref())?;

    let order = file_order(&set);
    for frame in samples.chunks_exact(channels) {
        for &pos in &order {
            w.write_all(&frame[pos].to_le_bytes())?;
        }
    }
    Ok(())
}

pub fn wav_to_bytes(format: &AudioFormat, samples: &[f32]) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::with_capacity(68 + samples.len() * 4);
    write_wav(&mut buf, format, samples)?;
    Ok(buf)
}

// --- Reading ---

/// A decoded WAV file.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedWav {
    /// Always [`SampleFormat::F32`](cm_ir::SampleFormat::F32): samples are
    /// converted on load.
    pub format: AudioFormat,
    /// Encoding tag of the file, with `WAVE_FORMAT_EXTENSIBLE` resolved to its
    /// sub-format.
    pub source_format_tag: u16,
    pub source_bits_per_sample: u16,
    /// Interleaved in chanmix channel order.
    pub samples: Vec<f32>,
}

impl LoadedWav {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channel_count().max(1)
    }
}

/// Load a WAV file from raw bytes.
pub fn load_wav(data: &[u8]) -> Result<LoadedWav, FormatError> {
    if data.len() < 12 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" {
        return Err(FormatError::InvalidHeader);
    }
    let riff = RiffHeader::read(&mut Cursor::new(data))?;
    if &riff.form != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt = None;
    let mut payload = None;
    while pos + 8 <= data.len() {
        let chunk = ChunkHeader::read(&mut Cursor::new(&data[pos..]))?;
        let body_start = pos + 8;
        let body_end = body_start.saturating_add(chunk.size as usize);
        // A truncated data chunk is common in the wild; keep what is there.
        let body = &data[body_start..body_end.min(data.len())];

        match &chunk.id {
            b"fmt " => fmt = Some(parse_fmt(body)?),
            b"data" => payload = Some(body),
            id => trace!(chunk = ?String::from_utf8_lossy(id), size = chunk.size, "skipping chunk"),
        }

        pos = body_end.saturating_add(body_end % 2);
    }

    let fmt = fmt.ok_or(FormatError::InvalidHeader)?;
    let payload = payload.ok_or(FormatError::InvalidHeader)?;
    decode(fmt, payload)
}

struct WavFmt {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    channel_mask: Option<u32>,
}

fn parse_fmt(body: &[u8]) -> Result<WavFmt, FormatError> {
    if body.len() < 16 {
        return Err(FormatError::UnexpectedEof);
    }
    let chunk = FmtChunk::read(&mut Cursor::new(body))?;
    let mut fmt = WavFmt {
        format_tag: chunk.format_tag,
        channels: chunk.channels,
        sample_rate: chunk.sample_rate,
        bits_per_sample: chunk.bits_per_sample,
        channel_mask: None,
    };

    if chunk.format_tag == FORMAT_EXTENSIBLE {
        if body.len() < 40 {
            return Err(FormatError::InvalidHeader);
        }
        let ext = FmtExtension::read(&mut Cursor::new(&body[16..]))?;
        if ext.sub_format_tail != SUBTYPE_GUID_TAIL {
            return Err(FormatError::Unsupported {
                format_tag: FORMAT_EXTENSIBLE,
                bits_per_sample: chunk.bits_per_sample,
            });
        }
        fmt.format_tag = ext.sub_format_tag;
        fmt.channel_mask = Some(ext.channel_mask);
    }
    Ok(fmt)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    U8,
    S16,
    S24,
    S32,
    F32,
    F64,
}

impl Encoding {
    fn of(format_tag: u16, bits_per_sample: u16) -> Result<Self, FormatError> {
        Ok(match (format_tag, bits_per_sample) {
            (FORMAT_PCM, 8) => Encoding::U8,
            (FORMAT_PCM, 16) => Encoding::S16,
            (FORMAT_PCM, 24) => Encoding::S24,
            (FORMAT_PCM, 32) => Encoding::S32,
            (FORMAT_IEEE_FLOAT, 32) => Encoding::F32,
            (FORMAT_IEEE_FLOAT, 64) => Encoding::F64,
            _ => {
                return Err(FormatError::Unsupported {
                    format_tag,
                    bits_per_sample,
                })
            }
        })
    }

    fn width(self) -> usize {
        match self {
            Encoding::U8 => 1,
            Encoding::S16 => 2,
            Encoding::S24 => 3,
            Encoding::S32 | Encoding::F32 => 4,
            Encoding::F64 => 8,
        }
    }

    fn decode(self, b: &[u8]) -> f32 {
        match self {
            // 8-bit WAV is unsigned, centered on 128.
            Encoding::U8 => (b[0] as f32 - 128.0) / 128.0,
            Encoding::S16 => i16::from_le_bytes([b[0], b[1]]) as f32 / 32_768.0,
            Encoding::S24 => (i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8) as f32 / 8_388_608.0,
            Encoding::S32 => {
                i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2_147_483_648.0
            }
            Encoding::F32 => f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            Encoding::F64 => {
                f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32
            }
        }
    }
}

fn decode(fmt: WavFmt, payload: &[u8]) -> Result<LoadedWav, FormatError> {
    let channels = usize::from(fmt.channels);
    if channels == 0 || channels > CHANNEL_COUNT {
        return Err(FormatError::UnsupportedChannels(fmt.channels));
    }
    if fmt.sample_rate == 0 {
        return Err(FormatError::InvalidHeader);
    }
    let encoding = Encoding::of(fmt.format_tag, fmt.bits_per_sample)?;
    let layout = layout_for(channels, fmt.channel_mask)
        .ok_or(FormatError::UnsupportedChannels(fmt.channels))?;

    let frame_bytes = encoding.width() * channels;
    let usable = payload.len() / frame_bytes * frame_bytes;
    if usable != payload.len() {
        debug!(
            dropped = payload.len() - usable,
            "ignoring trailing partial frame"
        );
    }

    let mut samples: Vec<f32> = payload[..usable]
        .chunks_exact(encoding.width())
        .map(|b| encoding.decode(b))
        .collect();

    let order = file_order(&layout.physical);
    let mut frame = [0.0f32; CHANNEL_COUNT];
    for chunk in samples.chunks_exact_mut(channels) {
        frame[..channels].copy_from_slice(chunk);
        for (file_pos, &pos) in order.iter().enumerate() {
            chunk[pos] = frame[file_pos];
        }
    }

    let format = AudioFormat::float32(fmt.sample_rate, layout);
    debug!(
        %format,
        format_tag = fmt.format_tag,
        bits = fmt.bits_per_sample,
        frames = samples.len() / channels,
        "loaded wav"
    );
    Ok(LoadedWav {
        format,
        source_format_tag: fmt.format_tag,
        source_bits_per_sample: fmt.bits_per_sample,
        samples,
    })
}

/// Layout named by a speaker mask, or the default one for the channel count
/// when the mask is absent or doesn't describe the data.
fn layout_for(channels: usize, mask: Option<u32>) -> Option<ChannelLayout> {
    if let Some(mask) = mask.filter(|&m| m != 0) {
        let set: ChannelSet = SPEAKERS
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|&(_, ch)| ch)
            .collect();
        let known = SPEAKERS.iter().fold(0u32, |acc, &(bit, _)| acc | bit);
        if mask & !known == 0 && set.len() == channels {
            return Some(ChannelLayout::new(set));
        }
        warn!(
            mask,
            channels, "speaker mask does not match data, using default layout"
        );
    }
    ChannelLayout::from_count(channels)
}

fn speaker_mask(set: &ChannelSet) -> u32 {
    SPEAKERS
        .iter()
        .filter(|(_, ch)| set.contains(*ch))
        .fold(0u32, |acc, &(bit, _)| acc | bit)
}

/// For each channel in file order, its index within a chanmix frame.
fn file_order(set: &ChannelSet) -> ArrayVec<usize, CHANNEL_COUNT> {
    let members = set.channels();
    SPEAKERS
        .iter()
        .filter_map(|&(_, ch)| members.iter().position(|&m| m == ch))
        .collect()
}
