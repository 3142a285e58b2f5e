//! Compress and decompress entry points.
//!
//! These wire a byte source and a byte sink to the stream driver for either
//! variant:
//!
//! - [`Config::Static`]: two passes over an in-memory copy of the input and
//!   a self-describing [`crate::framing`] container.
//! - [`Config::Adaptive`]: one pass over the source, a bare bitstream ending
//!   in the end-of-stream code. The configuration is not stored and must be
//!   supplied identically to [`decompress`].

use std::io::{Read, Write};

use log::debug;

use crate::adaptive::{AdaptiveConfig, AdaptiveController};
use crate::bitio::{BitReader, BitWriter};
use crate::driver::{decode_symbols, encode_end_marker, encode_source, Termination};
use crate::error::Result;
use crate::framing::{compress_and_frame, decompress_frame_into, parse_static_frame};
use crate::metrics::CodecStats;

/// Which variant to run, and with what parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Config {
    /// Whole-input tree sent in a header
    Static,
    /// Tree evolved on both ends from a shared seed
    Adaptive(AdaptiveConfig),
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        match self {
            Config::Static => Ok(()),
            Config::Adaptive(adaptive) => adaptive.validate(),
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, Config::Adaptive(_))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::Adaptive(AdaptiveConfig::default())
    }
}

/// Counts bytes passing through to the wrapped writer.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Counts bytes pulled from the wrapped reader.
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Compress everything `source` yields into `sink`.
///
/// # Errors
/// - `Error::Config` for invalid adaptive parameters
/// - source and sink I/O errors, unchanged
pub fn compress<R: Read, W: Write>(source: R, sink: W, config: &Config) -> Result<CodecStats> {
    config.validate()?;
    let mut stats = CodecStats::new();
    let mut sink = CountingWriter { inner: sink, count: 0 };

    match config {
        Config::Static => {
            let mut source = source;
            let mut data = Vec::new();
            source.read_to_end(&mut data)?;

            let frame = compress_and_frame(&data)?;
            sink.write_all(&frame)?;
            sink.flush()?;

            stats.input_bytes = data.len() as u64;
            stats.symbols = data.len() as u64;
        }
        Config::Adaptive(adaptive) => {
            debug!("adaptive compress: {}", adaptive.strategy);
            let mut model = AdaptiveController::new(adaptive)?;
            let mut source = CountingReader { inner: source, count: 0 };
            let mut writer = BitWriter::new(&mut sink);

            stats.symbols = encode_source(&mut model, &mut source, &mut writer)?;
            encode_end_marker(&model, &mut writer)?;
            writer.finish()?;

            stats.input_bytes = source.count;
            stats.rebuilds = model.rebuild_count();
            stats.normalizations = model.normalization_count();
        }
    }

    stats.output_bytes = sink.count;
    stats.complete();
    debug!(
        "compressed {} bytes into {} bytes",
        stats.input_bytes, stats.output_bytes
    );
    Ok(stats)
}

/// Decompress `source` into `sink`.
///
/// `config` must equal the one used to compress. A mismatch is not
/// detectable and yields wrong output or a stream error.
///
/// # Errors
/// - `HuffmanError::TruncatedStream` for incomplete input
/// - framing and CRC errors for a damaged static container
/// - source and sink I/O errors, unchanged
pub fn decompress<R: Read, W: Write>(source: R, sink: W, config: &Config) -> Result<CodecStats> {
    config.validate()?;
    let mut stats = CodecStats::new();
    let mut sink = CountingWriter { inner: sink, count: 0 };

    match config {
        Config::Static => {
            let mut source = source;
            let mut data = Vec::new();
            source.read_to_end(&mut data)?;
            stats.input_bytes = data.len() as u64;

            let frame = parse_static_frame(&data)?;
            stats.symbols = decompress_frame_into(&frame, &mut sink)?;
        }
        Config::Adaptive(adaptive) => {
            debug!("adaptive decompress: {}", adaptive.strategy);
            let mut model = AdaptiveController::new(adaptive)?;
            let mut reader = BitReader::new(source);

            stats.symbols =
                decode_symbols(&mut model, &mut reader, Termination::EndMarker, &mut sink)?;

            stats.input_bytes = reader_bytes(&reader);
            stats.rebuilds = model.rebuild_count();
            stats.normalizations = model.normalization_count();
        }
    }

    stats.output_bytes = sink.count;
    stats.complete();
    Ok(stats)
}

/// Bytes of compressed input the decoder actually consumed.
fn reader_bytes<R: Read>(reader: &BitReader<R>) -> u64 {
    reader.position().div_ceil(8)
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8], config: &Config) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(data, &mut out, config)?;
    Ok(out)
}

/// Decompress an in-memory buffer.
pub fn decompress_bytes(data: &[u8], config: &Config) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(data, &mut out, config)?;
    Ok(out)
}
