//! zvd-aac CLI
//!
//! Encodes raw interleaved s16 PCM to ADTS and decodes ADTS back to raw PCM

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use zvd_aac::codec::aac::{pipeline, AudioObjectType, BitrateMode, ChannelLayout};
use zvd_aac::{init, Config, DecoderSession, EncoderConfig, EncoderSession};

#[derive(Parser)]
#[command(name = "zvd-aac")]
#[command(about = "AAC encode/decode over the FDK AAC engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw interleaved s16 PCM into an ADTS stream
    Encode {
        /// Input PCM file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output ADTS file path
        #[arg(short, long)]
        output: PathBuf,

        /// Encoder configuration file (JSON); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of interleaved channels (1-8)
        #[arg(short, long)]
        channels: Option<u32>,

        /// Sample rate in Hz
        #[arg(short = 'r', long)]
        sample_rate: Option<u32>,

        /// Audio object type (2 = LC, 5 = HE-AAC, 29 = HE-AACv2, ...)
        #[arg(long)]
        aot: Option<u32>,

        /// VBR quality 1-5 (0 selects CBR)
        #[arg(long)]
        vbr: Option<u32>,

        /// CBR bitrate (e.g., 128k, 320000); estimated when omitted
        #[arg(short, long)]
        bitrate: Option<String>,
    },

    /// Decode an ADTS stream into raw interleaved s16 PCM
    Decode {
        /// Input ADTS file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output PCM file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List supported channel layouts
    Layouts,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize the library
    let config = Config {
        verbose: cli.verbose,
        debug: cli.debug,
    };

    init(config)?;

    info!("zvd-aac v{}", zvd_aac::VERSION);

    match cli.command {
        Commands::Encode {
            input,
            output,
            config,
            channels,
            sample_rate,
            aot,
            vbr,
            bitrate,
        } => {
            let mut encoder_config = match config {
                Some(path) => load_encoder_config(&path)?,
                None => EncoderConfig::default(),
            };
            if let Some(channels) = channels {
                encoder_config.channels = channels;
            }
            if let Some(sample_rate) = sample_rate {
                encoder_config.sample_rate = sample_rate;
            }
            if let Some(aot) = aot {
                encoder_config.audio_object_type = AudioObjectType::from(aot);
            }
            if let Some(vbr) = vbr {
                encoder_config.bitrate_mode = BitrateMode::from(vbr);
            }
            if let Some(bitrate) = bitrate {
                encoder_config.bitrate = Some(parse_bitrate_arg(&bitrate)?);
            }

            info!("Encoding {} -> {}", input.display(), output.display());
            cmd_encode(&input, &output, &encoder_config)?;
        }
        Commands::Decode { input, output } => {
            info!("Decoding {} -> {}", input.display(), output.display());
            cmd_decode(&input, &output)?;
        }
        Commands::Layouts => {
            cmd_layouts()?;
        }
    }

    Ok(())
}

fn load_encoder_config(path: &Path) -> anyhow::Result<EncoderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("Invalid encoder config {}", path.display()))?;
    Ok(config)
}

fn cmd_encode(input: &Path, output: &Path, config: &EncoderConfig) -> anyhow::Result<()> {
    let pcm = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut session = EncoderSession::with_config(config)?;
    let packets = pipeline::encode_stream(&mut session, &pcm)?;
    session.destroy();

    let adts = packets.concat();
    fs::write(output, &adts).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Layout:      {}", session.layout().mode);
    println!("Sample Rate: {} Hz", config.sample_rate);
    println!("Bitrate:     {:?}", session.bitrate_plan());
    println!("Frames:      {}", packets.len());
    println!("Output:      {} bytes", adts.len());
    Ok(())
}

fn cmd_decode(input: &Path, output: &Path) -> anyhow::Result<()> {
    let adts = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut session = DecoderSession::create()?;
    let frames = pipeline::decode_stream(&mut session, &adts)?;
    let metadata = session.metadata()?;
    session.destroy();

    let pcm: Vec<u8> = frames.iter().flat_map(|f| f.pcm.iter().copied()).collect();
    fs::write(output, &pcm).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Sample Rate: {} Hz", metadata.sample_rate);
    println!("Channels:    {}", metadata.channel_count);
    println!("Frame Size:  {}", metadata.frame_size);
    println!("Frames:      {}", frames.len());
    println!("Output:      {} bytes", pcm.len());
    Ok(())
}

fn cmd_layouts() -> anyhow::Result<()> {
    println!("Supported Channel Layouts:");
    println!("─────────────────────────────────");
    println!("{:<10} {:<8} {:<6} {:<6}", "Channels", "Mode", "SCE", "CPE");
    println!("─────────────────────────────────");

    for channels in 1..=8 {
        let layout = ChannelLayout::resolve(channels)?;
        println!(
            "{:<10} {:<8} {:<6} {:<6}",
            channels,
            layout.mode.to_string(),
            layout.single_channel_elements,
            layout.channel_pair_elements
        );
    }

    Ok(())
}

fn parse_bitrate_arg(value: &str) -> anyhow::Result<u32> {
    let value = value.trim();

    let (num_str, multiplier) = if value.ends_with('k') || value.ends_with('K') {
        (&value[..value.len() - 1], 1_000f64)
    } else if value.ends_with('M') || value.ends_with('m') {
        (&value[..value.len() - 1], 1_000_000f64)
    } else {
        (value, 1f64)
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid bitrate: {}", value))?;
    let bits = num * multiplier;
    if !(0.0..=u32::MAX as f64).contains(&bits) {
        anyhow::bail!("Bitrate out of range: {}", value);
    }

    Ok(bits as u32)
}
