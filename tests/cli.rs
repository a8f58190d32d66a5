//! End-to-end runs of the `chanmix` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use cm_formats::{load_wav, wav_to_bytes};
use cm_ir::{AudioFormat, ChannelLayout};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chanmix-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn chanmix() -> Command {
    Command::new(env!("CARGO_BIN_EXE_chanmix"))
}

fn write_input(name: &str, layout: ChannelLayout, samples: &[f32]) -> PathBuf {
    let path = scratch(name);
    let format = AudioFormat::float32(48000, layout);
    fs::write(&path, wav_to_bytes(&format, samples).unwrap()).unwrap();
    path
}

#[test]
fn convert_downmixes_file() {
    let input = write_input("quad.wav", ChannelLayout::quad(), &[1.0, 2.0, 3.0, 4.0]);
    let output = scratch("quad-stereo.wav");

    let status = chanmix()
        .args(["convert", "--to", "stereo", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let wav = load_wav(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(wav.format.layout, ChannelLayout::stereo());
    assert_eq!(wav.samples, [1.0, 2.0]);
}

#[test]
fn convert_reads_json_config() {
    let input = write_input("dual.wav", ChannelLayout::stereo(), &[0.1, 0.9, 0.2, 0.8]);
    let output = scratch("dual-right.wav");
    let config = scratch("right.json");
    fs::write(
        &config,
        r#"{ "output_layout": "mono-right", "input_layout": "dual-mono", "block_frames": 1 }"#,
    )
    .unwrap();

    let status = chanmix()
        .arg("convert")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .status()
        .unwrap();
    assert!(status.success());

    let wav = load_wav(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(wav.format.layout, ChannelLayout::mono_right());
    assert_eq!(wav.samples, [0.9, 0.8]);
}

#[test]
fn info_reports_layout() {
    let input = write_input("info.wav", ChannelLayout::surround_5_1(), &[0.0; 12]);
    let out = chanmix().arg("info").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Channels: 6"));
    assert!(stdout.contains("2 frames"));
}

#[test]
fn unknown_layout_fails() {
    let input = write_input("bad.wav", ChannelLayout::stereo(), &[0.0; 2]);
    let out = chanmix()
        .args(["convert", "--to", "hexaphonic", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(scratch("never.wav"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("hexaphonic"));
}

#[test]
fn unconvertible_layouts_fail_without_output() {
    let input = write_input("two-programs.wav", ChannelLayout::stereo(), &[1.0, 2.0]);
    let output = scratch("two-programs-5.1.wav");
    let out = chanmix()
        .args(["convert", "--from", "dual-mono", "--to", "5.1", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot convert"));
    assert!(!output.exists());
}
