//! chanmix CLI: inspect WAV files and remap their channel layout.
//!
//! Usage:
//!   chanmix info input.wav
//!   chanmix convert -i input.wav -o output.wav --to stereo
//!   chanmix convert -i input.wav -o left.wav --from dual-mono --to mono-left

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cm_master::{RemixConfig, Remixer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Trivial audio channel-layout remapper
#[derive(Parser)]
#[command(name = "chanmix", version)]
#[command(about = "Drop, duplicate or swap audio channels in WAV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the format and channel layout of a WAV file
    Info {
        /// Input WAV file
        file: PathBuf,
    },
    /// Remap a WAV file to another channel layout
    Convert {
        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file (32-bit float)
        #[arg(short, long)]
        output: PathBuf,

        /// Target layout: a preset (mono, stereo, 5.1, mono-left, ...) or
        /// speaker labels joined by '+' (e.g. L+R+C)
        #[arg(long, required_unless_present = "config")]
        to: Option<String>,

        /// Reinterpret the input layout (e.g. dual-mono)
        #[arg(long)]
        from: Option<String>,

        /// Frames per processing block
        #[arg(long)]
        block_frames: Option<usize>,

        /// Cap on a single block allocation, in samples
        #[arg(long)]
        max_block_samples: Option<usize>,

        /// JSON config file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match Cli::parse().command {
        Commands::Info { file } => print_info(&file),
        Commands::Convert {
            input,
            output,
            to,
            from,
            block_frames,
            max_block_samples,
            config,
        } => {
            let mut settings = match &config {
                Some(path) => RemixConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => RemixConfig::default(),
            };
            if let Some(to) = to {
                settings.output_layout = to;
            }
            if from.is_some() {
                settings.input_layout = from;
            }
            if let Some(frames) = block_frames {
                settings.block_frames = frames;
            }
            if max_block_samples.is_some() {
                settings.max_block_samples = max_block_samples;
            }
            convert(&input, &output, settings)
        }
    }
}

fn print_info(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let wav = cm_formats::load_wav(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let format = &wav.format;
    println!("File:     {}", path.display());
    println!(
        "Encoding: tag {:#06x}, {} bits",
        wav.source_format_tag, wav.source_bits_per_sample
    );
    println!("Rate:     {} Hz", format.rate);
    println!("Channels: {}", format.channel_count());
    println!("Layout:   {}", format.layout);
    println!(
        "Length:   {} frames ({:.3} s)",
        wav.frames(),
        wav.frames() as f64 / f64::from(format.rate)
    );
    Ok(())
}

fn convert(input: &Path, output: &Path, settings: RemixConfig) -> Result<()> {
    let remixer = Remixer::new(settings).context("invalid remix settings")?;

    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let result = remixer
        .remix_wav(&data)
        .with_context(|| format!("failed to remix {}", input.display()))?;

    let bytes = result
        .to_wav_bytes()
        .context("failed to encode output")?;
    fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if result.stats.bypassed() {
        info!(output = %output.display(), "layout unchanged, copied samples");
    } else {
        info!(
            output = %output.display(),
            layout = %result.format.layout,
            frames = result.frames(),
            blocks = result.stats.blocks,
            "wrote remixed file"
        );
    }
    Ok(())
}
