//! Round trips through the on-disk WAV representation.

use cm_formats::{load_wav, wav_to_bytes, FormatError};
use cm_ir::{AudioFormat, Channel, ChannelLayout, ChannelSet};

fn le_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[test]
fn stereo_float_file_is_plain_ieee_float() {
    let format = AudioFormat::float32(44100, ChannelLayout::stereo());
    let bytes = wav_to_bytes(&format, &[0.5, -0.5, 0.25, -0.25]).unwrap();

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..16], b"WAVEfmt ");
    assert_eq!(u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 16);
    assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 3);
    assert_eq!(bytes.len(), 44 + 16);

    let loaded = load_wav(&bytes).unwrap();
    assert_eq!(loaded.format, format);
    assert_eq!(loaded.samples, [0.5, -0.5, 0.25, -0.25]);
}

#[test]
fn surround_is_stored_in_speaker_mask_order() {
    let format = AudioFormat::float32(48000, ChannelLayout::surround_5_1());
    // L R RL RR C LFE
    let frame = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let bytes = wav_to_bytes(&format, &frame).unwrap();

    // FL FR FC LFE BL BR
    assert_eq!(le_f32(&bytes[44..]), [1.0, 2.0, 5.0, 6.0, 3.0, 4.0]);
    assert_eq!(load_wav(&bytes).unwrap().samples, frame);
}

#[test]
fn non_default_layout_survives_reload() {
    let format = AudioFormat::float32(48000, ChannelLayout::mono_left());
    let bytes = wav_to_bytes(&format, &[0.1, 0.2, 0.3]).unwrap();
    assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 0xFFFE);

    let loaded = load_wav(&bytes).unwrap();
    assert_eq!(loaded.format.layout, ChannelLayout::mono_left());
    assert_eq!(loaded.source_format_tag, 3);
    assert_eq!(loaded.samples, [0.1, 0.2, 0.3]);
}

#[test]
fn custom_speaker_set_survives_reload() {
    let set = ChannelSet::from_channels(&[Channel::Left, Channel::Right, Channel::RearCenter]);
    let format = AudioFormat::float32(32000, ChannelLayout::new(set));
    let loaded = load_wav(&wav_to_bytes(&format, &[1.0, 2.0, 3.0]).unwrap()).unwrap();
    assert_eq!(loaded.format.layout.physical, set);
    assert_eq!(loaded.samples, [1.0, 2.0, 3.0]);
}

#[test]
fn misaligned_samples_are_refused() {
    let format = AudioFormat::float32(48000, ChannelLayout::stereo());
    assert!(matches!(
        wav_to_bytes(&format, &[0.0; 3]),
        Err(FormatError::Misaligned {
            samples: 3,
            channels: 2
        })
    ));
}

#[test]
fn truncated_data_chunk_keeps_whole_frames() {
    let format = AudioFormat::float32(48000, ChannelLayout::stereo());
    let mut bytes = wav_to_bytes(&format, &[0.5; 8]).unwrap();
    bytes.truncate(bytes.len() - 6);
    let loaded = load_wav(&bytes).unwrap();
    assert_eq!(loaded.frames(), 3);
}
