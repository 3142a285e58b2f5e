//! huffstream: compress and decompress files with static or adaptive
//! Huffman coding.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` (or `trace` for
//! every tree rebuild) to watch the codec work.

mod config;
mod input_gen;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};
use thiserror::Error;

use huffstream_core::{compress, decompress, CodecStats};

use crate::config::{Args, Config, Operation};

/// Errors surfaced by the command-line tool.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] huffstream_core::Error),

    #[error("{path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("round trip mismatch: {original} bytes in, {restored} bytes back")]
    RoundTrip { original: usize, restored: usize },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match Config::from_args(args).and_then(|config| run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("huffstream: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    if config.print {
        config.print();
    }

    match &config.operation {
        Operation::Encode {
            source,
            destination,
        } => {
            let stats = transcode_file(source, destination, config, false)?;
            report(config, &stats, false);
        }
        Operation::Decode {
            source,
            destination,
        } => {
            let stats = transcode_file(source, destination, config, true)?;
            report(config, &stats, true);
        }
        Operation::Demo { seed, sample_bytes } => {
            let data = input_gen::generate_sample_data(*seed, *sample_bytes);
            info!("generated {} sample bytes with seed {seed}", data.len());

            let (compressed, restored) = round_trip(&data, config)?;
            println!(
                "{} bytes -> {} bytes -> {} bytes (seed {seed})",
                data.len(),
                compressed.output_bytes,
                restored.output_bytes
            );
            report(config, &compressed, false);
            report(config, &restored, true);
        }
    }

    Ok(())
}

/// Encode or decode `source` into `destination`.
///
/// A destination left behind by a failed run is removed.
fn transcode_file(
    source: &Path,
    destination: &Path,
    config: &Config,
    decoding: bool,
) -> Result<CodecStats, AppError> {
    let input = File::open(source).map_err(|e| file_error(source, e))?;
    let output = File::create(destination).map_err(|e| file_error(destination, e))?;
    let mut output = BufWriter::new(output);

    let result = if decoding {
        decompress(input, &mut output, &config.codec)
    } else {
        compress(input, &mut output, &config.codec)
    }
    .map_err(AppError::from)
    .and_then(|stats| {
        output.flush().map_err(|e| file_error(destination, e))?;
        Ok(stats)
    });

    if result.is_err() {
        drop(output);
        if let Err(e) = fs::remove_file(destination) {
            warn!("could not remove {}: {e}", destination.display());
        }
    }
    result
}

/// Compress `data`, decompress the result and check it matches.
fn round_trip(data: &[u8], config: &Config) -> Result<(CodecStats, CodecStats), AppError> {
    let mut packed = Vec::new();
    let compressed = compress(data, &mut packed, &config.codec)?;

    let mut unpacked = Vec::with_capacity(data.len());
    let restored = decompress(&packed[..], &mut unpacked, &config.codec)?;

    if unpacked != data {
        return Err(AppError::RoundTrip {
            original: data.len(),
            restored: unpacked.len(),
        });
    }
    Ok((compressed, restored))
}

fn report(config: &Config, stats: &CodecStats, decompressing: bool) {
    info!(
        "{} {} -> {} bytes in {} ms",
        if decompressing { "decoded" } else { "encoded" },
        stats.input_bytes,
        stats.output_bytes,
        stats.duration().as_millis()
    );
    if config.print {
        stats.print_summary(decompressing);
    }
}

fn file_error(path: &Path, source: std::io::Error) -> AppError {
    AppError::File {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huffstream_core::{AdaptiveConfig, Config as CodecConfig};

    fn file_config(operation: Operation, codec: CodecConfig) -> Config {
        Config {
            operation,
            codec,
            print: false,
        }
    }

    fn file_round_trip(codec: CodecConfig) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sample.bin");
        let packed = dir.path().join("sample.huff");
        let restored = dir.path().join("restored.bin");

        let data = input_gen::generate_sample_data(11, 70_000);
        fs::write(&source, &data).unwrap();

        let encode = file_config(
            Operation::Encode {
                source: source.clone(),
                destination: packed.clone(),
            },
            codec,
        );
        run(&encode).unwrap();
        assert!(fs::metadata(&packed).unwrap().len() < data.len() as u64);

        let decode = file_config(
            Operation::Decode {
                source: packed,
                destination: restored.clone(),
            },
            codec,
        );
        run(&decode).unwrap();
        assert_eq!(fs::read(&restored).unwrap(), data);
    }

    #[test]
    fn test_static_file_round_trip() {
        file_round_trip(CodecConfig::Static);
    }

    #[test]
    fn test_adaptive_file_round_trip() {
        file_round_trip(CodecConfig::Adaptive(AdaptiveConfig::reconstruct(128)));
        file_round_trip(CodecConfig::Adaptive(AdaptiveConfig::normalize(4096)));
    }

    #[test]
    fn test_failed_decode_removes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.huff");
        let destination = dir.path().join("broken");
        fs::write(&source, b"not a container").unwrap();

        let decode = file_config(
            Operation::Decode {
                source,
                destination: destination.clone(),
            },
            CodecConfig::Static,
        );
        assert!(matches!(run(&decode), Err(AppError::Core(_))));
        assert!(!destination.exists());
    }

    #[test]
    fn test_missing_source_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("missing.txt");
        let encode = file_config(
            Operation::Encode {
                source: source.clone(),
                destination: dir.path().join("missing.huff"),
            },
            CodecConfig::Static,
        );
        let err = run(&encode).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_demo_round_trip() {
        for codec in [
            CodecConfig::Static,
            CodecConfig::Adaptive(AdaptiveConfig::freeze(1000)),
            CodecConfig::Adaptive(AdaptiveConfig::reconstruct(256)),
        ] {
            let config = file_config(
                Operation::Demo {
                    seed: 3,
                    sample_bytes: 30_000,
                },
                codec,
            );
            let data = input_gen::generate_sample_data(3, 30_000);
            let (compressed, restored) = round_trip(&data, &config).unwrap();
            assert_eq!(compressed.input_bytes, 30_000);
            assert_eq!(restored.output_bytes, 30_000);
            run(&config).unwrap();
        }
    }
}
