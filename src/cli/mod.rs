//! Command-line interface for the JPEG 2000 pixel data transcoder.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec::sniff;
use crate::config::{CodecConfig, EncodeParameters};
use crate::dicom::{utils, DicomFile, DicomMetadata};
use crate::error::{Result, TranscodeError};
use crate::fragment::FragmentSequence;
use crate::pipeline::PipelineBuilder;
use crate::pixel::{Dimensions, PixelFormat};
use crate::progress::{CallbackProgress, NullProgress, ProgressEvent, ProgressHandler, ProgressPhase};

/// JPEG 2000 pixel data transcoder
///
/// Encodes raw raster buffers into per-slice JPEG 2000 fragments and decodes
/// them back, reading geometry from the command line or a DICOM file.
#[derive(Parser, Debug)]
#[command(name = "medimg-j2k")]
#[command(version)]
#[command(about = "Transcode DICOM pixel data to and from JPEG 2000")]
#[command(long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a raw raster file into a fragment item stream
    Encode {
        /// Raw little-endian raster file
        #[arg(short, long)]
        input: PathBuf,

        /// Output item stream file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Target compression ratio; lossless when omitted
        #[arg(short = 'r', long)]
        ratio: Option<f32>,

        /// Number of quality layers
        #[arg(long)]
        layers: Option<u32>,

        /// Comment written into each codestream
        #[arg(long)]
        comment: Option<String>,

        /// Fill the basic offset table
        #[arg(long)]
        offset_table: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Decode a fragment item stream, or a DICOM file, into a raw raster file
    Decode {
        /// Item stream file
        #[arg(short, long, required_unless_present = "dicom", conflicts_with = "dicom")]
        input: Option<PathBuf>,

        /// DICOM file providing the fragments and the geometry
        #[arg(long)]
        dicom: Option<PathBuf>,

        /// Output raw raster file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Fail when the fragment count differs from the depth
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Report whether a file holds a raw codestream or a boxed JP2 file
    Sniff {
        /// Codestream file
        input: PathBuf,
    },

    /// Show the pixel data attributes of a DICOM file
    Info {
        /// Input DICOM file path
        #[arg(short, long)]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Pixel format and dimensions given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct GeometryArgs {
    /// Image width (columns)
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height (rows)
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of slices
    #[arg(long, default_value = "1")]
    pub depth: u32,

    /// Bits allocated per sample (8, 16 or 32)
    #[arg(long)]
    pub bits: Option<u16>,

    /// Samples per pixel (1 or 3)
    #[arg(long, default_value = "1")]
    pub samples: u16,

    /// Samples are signed
    #[arg(long)]
    pub signed: bool,
}

impl GeometryArgs {
    /// Resolve into a pixel format and dimensions.
    pub fn resolve(&self) -> Result<(PixelFormat, Dimensions)> {
        let missing = |name: &str| TranscodeError::Config(format!("--{} is required", name));
        let width = self.width.ok_or_else(|| missing("width"))?;
        let height = self.height.ok_or_else(|| missing("height"))?;
        let bits = self.bits.ok_or_else(|| missing("bits"))?;

        let format = PixelFormat::new(bits, self.samples, u16::from(self.signed));
        let dims = Dimensions::new(width, height, self.depth);
        format.validate()?;
        dims.validate()?;
        Ok((format, dims))
    }
}

/// Configuration file and thread count.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Worker threads (0 = one per CPU)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl SettingsArgs {
    /// Load the configuration file, if any, and apply overrides.
    pub fn load(&self) -> Result<CodecConfig> {
        let mut config = match self.config {
            Some(ref path) => CodecConfig::from_file(path)?,
            None => CodecConfig::default(),
        };
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        Ok(config)
    }
}

/// Run the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else if !cli.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
    }

    match cli.command {
        Commands::Encode {
            input,
            output,
            geometry,
            ratio,
            layers,
            comment,
            offset_table,
            settings,
        } => {
            let mut config = settings.load()?;
            config.encode = apply_encode_overrides(config.encode, ratio, layers, comment);
            let (format, dims) = geometry.resolve()?;
            let summary = encode_file(&input, &output, &format, &dims, config, offset_table, cli.quiet)?;
            if !cli.quiet {
                println!("{}", summary);
            }
            Ok(())
        }
        Commands::Decode {
            input,
            dicom,
            output,
            geometry,
            strict,
            settings,
        } => {
            let mut config = settings.load()?;
            config.decode.strict_fragment_count |= strict;

            let (fragments, format, dims) = match (dicom, input) {
                (Some(path), _) => {
                    let file = DicomFile::open(&path)?;
                    if !file.metadata.is_jpeg2000() {
                        return Err(TranscodeError::UnsupportedFormat(format!(
                            "transfer syntax {} is not JPEG 2000",
                            file.metadata.transfer_syntax
                        )));
                    }
                    (file.fragments()?, file.pixel_format(), file.dimensions())
                }
                (None, Some(path)) => {
                    let (format, dims) = geometry.resolve()?;
                    (read_fragments(&path)?, format, dims)
                }
                (None, None) => {
                    return Err(TranscodeError::Config("--input or --dicom is required".into()))
                }
            };

            let summary = decode_to_file(&fragments, &output, &format, &dims, config, cli.quiet)?;
            if !cli.quiet {
                println!("{}", summary);
            }
            Ok(())
        }
        Commands::Sniff { input } => {
            let data = std::fs::read(&input)?;
            println!("{}: {}", input.display(), sniff(&data));
            Ok(())
        }
        Commands::Info { input, json } => run_info(&input, json),
    }
}

fn apply_encode_overrides(
    mut params: EncodeParameters,
    ratio: Option<f32>,
    layers: Option<u32>,
    comment: Option<String>,
) -> EncodeParameters {
    if let Some(ratio) = ratio {
        params.lossless_only = false;
        params.target_ratio = Some(ratio);
    }
    if let Some(layers) = layers {
        params.number_of_layers = layers;
    }
    if comment.is_some() {
        params.comment = comment;
    }
    params
}

/// Read an item stream file.
pub fn read_fragments(path: &Path) -> Result<FragmentSequence> {
    let mut reader = BufReader::new(File::open(path)?);
    FragmentSequence::read_from(&mut reader)
}

/// Encode a raw raster file into an item stream file.
pub fn encode_file(
    input: &Path,
    output: &Path,
    format: &PixelFormat,
    dims: &Dimensions,
    config: CodecConfig,
    offset_table: bool,
    quiet: bool,
) -> Result<String> {
    let raster = std::fs::read(input)?;
    let codec = PipelineBuilder::new()
        .config(config)
        .progress(progress_bar(dims.depth as usize, "Encoding", quiet))
        .build();

    let fragments = codec.encode(&raster, format, dims)?;

    let mut writer = BufWriter::new(File::create(output)?);
    fragments.write_to(&mut writer, offset_table)?;
    writer.flush()?;

    Ok(format!(
        "Encoded {} ({} bytes) into {} fragments ({} bytes, ratio {:.2}:1)",
        dims,
        raster.len(),
        fragments.len(),
        fragments.payload_len(),
        raster.len() as f64 / fragments.payload_len().max(1) as f64
    ))
}

/// Decode fragments into a raw raster file.
pub fn decode_to_file(
    fragments: &FragmentSequence,
    output: &Path,
    format: &PixelFormat,
    dims: &Dimensions,
    config: CodecConfig,
    quiet: bool,
) -> Result<String> {
    let codec = PipelineBuilder::new()
        .config(config)
        .progress(progress_bar(fragments.len(), "Decoding", quiet))
        .build();

    let raster = codec.decode(fragments, format, dims)?;
    std::fs::write(output, &raster)?;

    Ok(format!(
        "Decoded {} fragments into {} bytes ({})",
        fragments.len(),
        raster.len(),
        dims
    ))
}

fn progress_bar(total: usize, label: &'static str, quiet: bool) -> Arc<dyn ProgressHandler> {
    if quiet || total <= 1 {
        return Arc::new(NullProgress);
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} slices ({elapsed})") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(label);

    Arc::new(CallbackProgress::new(move |event: ProgressEvent| match event.phase {
        ProgressPhase::Encoding | ProgressPhase::Decoding => bar.inc(1),
        ProgressPhase::Complete => bar.finish_and_clear(),
        ProgressPhase::Failed => bar.abandon_with_message(event.message),
    }))
}

#[derive(Serialize)]
struct InfoReport<'a> {
    #[serde(flatten)]
    metadata: &'a DicomMetadata,
    transfer_syntax_name: &'static str,
    jpeg2000: bool,
    fragments: Option<usize>,
    expected_size: usize,
}

fn run_info(input: &Path, json: bool) -> Result<()> {
    let dicom = DicomFile::open(input)?;
    let metadata = &dicom.metadata;

    let report = InfoReport {
        metadata,
        transfer_syntax_name: utils::transfer_syntax_name(&metadata.transfer_syntax),
        jpeg2000: metadata.is_jpeg2000(),
        fragments: dicom.fragments().ok().map(|f| f.len()),
        expected_size: utils::calculate_pixel_data_size(metadata),
    };

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| TranscodeError::InvalidFormat(format!("JSON output failed: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("DICOM File Information");
    println!("======================");
    println!("File: {}", input.display());
    println!();

    println!("Image Properties:");
    println!("  Dimensions: {}", metadata.dimensions());
    println!("  Bits Stored: {}", metadata.bits_stored);
    println!("  Bits Allocated: {}", metadata.bits_allocated);
    println!("  Samples/Pixel: {}", metadata.samples_per_pixel);
    println!("  Photometric: {}", metadata.photometric_interpretation);
    println!(
        "  Signed: {}",
        if metadata.pixel_representation == 1 {
            "Yes"
        } else {
            "No"
        }
    );
    println!();

    println!("Transfer Syntax:");
    println!("  UID: {}", metadata.transfer_syntax);
    println!("  Name: {}", report.transfer_syntax_name);
    println!("  JPEG 2000: {}", if report.jpeg2000 { "Yes" } else { "No" });
    if let Some(count) = report.fragments {
        println!("  Fragments: {}", count);
    }
    println!();

    println!("Pixel Data:");
    println!(
        "  Expected Size: {} bytes ({:.2} MB)",
        report.expected_size,
        report.expected_size as f64 / 1_048_576.0
    );

    Ok(())
}
