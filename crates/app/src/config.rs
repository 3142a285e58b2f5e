//! Configuration for the huffstream application.
//!
//! Command-line arguments are parsed with clap and then resolved into a
//! [`Config`]: the operation to run, the concrete file paths and the codec
//! parameters handed to `huffstream-core`.
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments: without a SOURCE it compresses a
//! generated sample in memory, checks the round trip and reports. Seeds are
//! printed so demo runs are reproducible.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use huffstream_core::adaptive::{
    DEFAULT_FREEZE_AFTER, DEFAULT_NORMALIZE_THRESHOLD, DEFAULT_RECONSTRUCT_INTERVAL,
};
use huffstream_core::{AdaptiveConfig, Config as CodecConfig};

use crate::AppError;

/// Extension of static containers.
pub const STATIC_EXTENSION: &str = "huff";

/// Extension of adaptive bitstreams.
pub const ADAPTIVE_EXTENSION: &str = "huff_a";

/// Default demo sample size (256 KiB).
const DEFAULT_SAMPLE_BYTES: usize = 256 * 1024;

/// Static and adaptive Huffman compression of files.
///
/// Adaptive parameters are not stored in the output; decode with the same
/// --strategy, -n and --threshold that were used to encode.
#[derive(Parser, Debug, Clone)]
#[command(name = "huffstream")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File to encode or decode (omit to run an in-memory demo)
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Output file (default: derived from SOURCE)
    #[arg(short, long, value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Decode SOURCE instead of encoding it
    #[arg(short = 'D', long)]
    pub decode: bool,

    /// Print the resolved configuration and run statistics
    #[arg(short, long)]
    pub print: bool,

    /// Use the adaptive variant (.huff_a) instead of the static one (.huff)
    #[arg(short, long)]
    pub adaptive: bool,

    /// Adaptive update strategy [default: reconstruct]
    #[arg(long, value_enum, requires = "adaptive")]
    pub strategy: Option<StrategyArg>,

    /// Rebuild interval (reconstruct, normalize) or freeze point (freeze)
    #[arg(short, long = "n-value", value_name = "N", requires = "adaptive")]
    pub n_value: Option<u64>,

    /// Normalization threshold for --strategy normalize
    #[arg(long, value_name = "T", requires = "adaptive")]
    pub threshold: Option<u64>,

    /// Seed for the demo sample (default: time based)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Size of the demo sample in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SAMPLE_BYTES)]
    pub sample_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Build one tree after N symbols and keep it (N = 0 keeps the seed tree)
    Freeze,
    /// Rebuild the tree every N symbols
    Reconstruct,
    /// Halve counts once their total passes T, rebuild every N symbols
    Normalize,
}

/// What a run does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Encode { source: PathBuf, destination: PathBuf },
    Decode { source: PathBuf, destination: PathBuf },
    /// Round-trip a generated sample in memory
    Demo { seed: u64, sample_bytes: usize },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub operation: Operation,

    /// Codec variant and parameters
    pub codec: CodecConfig,

    /// Whether to print the configuration and statistics
    pub print: bool,
}

impl Config {
    /// Resolve parsed arguments into a runnable configuration.
    pub fn from_args(args: Args) -> Result<Self, AppError> {
        let codec = resolve_codec(&args)?;
        codec.validate()?;

        let extension = if codec.is_adaptive() {
            ADAPTIVE_EXTENSION
        } else {
            STATIC_EXTENSION
        };

        let operation = match args.source {
            None => {
                if args.decode || args.destination.is_some() {
                    return Err(AppError::Usage(
                        "--decode and --destination need a SOURCE file".into(),
                    ));
                }
                Operation::Demo {
                    seed: args.seed.unwrap_or_else(time_seed),
                    sample_bytes: args.sample_bytes,
                }
            }
            Some(source) if args.decode => {
                if !has_extension(&source, extension) {
                    return Err(AppError::Usage(format!(
                        "wrong source extension for decoding: {} (expected .{extension})",
                        source.display()
                    )));
                }
                let destination = args.destination.unwrap_or_else(|| source.with_extension(""));
                Operation::Decode { source, destination }
            }
            Some(source) => {
                let destination = args
                    .destination
                    .unwrap_or_else(|| source.with_extension(extension));
                if !has_extension(&destination, extension) {
                    return Err(AppError::Usage(format!(
                        "wrong destination extension for encoding: {} (expected .{extension})",
                        destination.display()
                    )));
                }
                Operation::Encode { source, destination }
            }
        };

        Ok(Config {
            operation,
            codec,
            print: args.print,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.operation {
            Operation::Encode {
                source,
                destination,
            } => {
                println!("Encode: {} -> {}", source.display(), destination.display());
            }
            Operation::Decode {
                source,
                destination,
            } => {
                println!("Decode: {} -> {}", source.display(), destination.display());
            }
            Operation::Demo { seed, sample_bytes } => {
                println!("Demo: {sample_bytes} generated bytes");
                println!("Seed: {seed}");
            }
        }
        match &self.codec {
            CodecConfig::Static => println!("Variant: static"),
            CodecConfig::Adaptive(adaptive) => {
                println!("Variant: adaptive ({})", adaptive.strategy);
            }
        }
        println!();
    }
}

fn resolve_codec(args: &Args) -> Result<CodecConfig, AppError> {
    if !args.adaptive {
        return Ok(CodecConfig::Static);
    }

    let strategy = args.strategy.unwrap_or(StrategyArg::Reconstruct);
    if args.threshold.is_some() && strategy != StrategyArg::Normalize {
        return Err(AppError::Usage(
            "--threshold only applies to --strategy normalize".into(),
        ));
    }

    let adaptive = match strategy {
        StrategyArg::Freeze => {
            AdaptiveConfig::freeze(args.n_value.unwrap_or(DEFAULT_FREEZE_AFTER))
        }
        StrategyArg::Reconstruct => {
            AdaptiveConfig::reconstruct(args.n_value.unwrap_or(DEFAULT_RECONSTRUCT_INTERVAL))
        }
        StrategyArg::Normalize => AdaptiveConfig::normalize_every(
            args.threshold.unwrap_or(DEFAULT_NORMALIZE_THRESHOLD),
            args.n_value.unwrap_or(1),
        ),
    };
    Ok(CodecConfig::Adaptive(adaptive))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|t| t.as_millis() as u64)
        .unwrap_or(0)
}
