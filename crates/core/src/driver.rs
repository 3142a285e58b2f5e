//! Stream driver: one symbol at a time through a [`CodingModel`].
//!
//! Encoding is encode-then-observe, decoding is decode-then-observe, so the
//! model sees the same sequence on both ends. Input and output move through
//! fixed-size byte buffers; the chunk size never changes which bits are
//! produced.

use std::io::{ErrorKind, Read, Write};

use crate::bitio::{BitReader, BitWriter, IO_CHUNK_SIZE};
use crate::codec::{decode_symbol, encode_symbol};
use crate::error::{HuffmanError, Result};
use crate::frequency::{Symbol, EOS};
use crate::model::CodingModel;

/// How a decoder knows the stream is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exactly this many symbols were encoded (static header)
    Count(u64),
    /// The stream ends with the [`EOS`] symbol (adaptive streams)
    EndMarker,
}

/// Encode every symbol of `symbols`, observing each right after it is written.
///
/// Returns the number of symbols encoded.
pub fn encode_symbols<M, I, W>(model: &mut M, symbols: I, writer: &mut BitWriter<W>) -> Result<u64>
where
    M: CodingModel,
    I: IntoIterator<Item = Symbol>,
    W: Write,
{
    let mut count = 0u64;
    for symbol in symbols {
        encode_symbol(symbol, model.codes(), writer)?;
        model.observe(symbol)?;
        count += 1;
    }
    Ok(count)
}

/// Encode every byte `source` yields until it reports end of input.
///
/// The source is read `IO_CHUNK_SIZE` bytes at a time. Returns the number of
/// bytes encoded. No end marker is written.
pub fn encode_source<M, R, W>(model: &mut M, mut source: R, writer: &mut BitWriter<W>) -> Result<u64>
where
    M: CodingModel,
    R: Read,
    W: Write,
{
    let mut buffer = vec![0u8; IO_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = read_chunk(&mut source, &mut buffer)?;
        if n == 0 {
            return Ok(total);
        }
        total += encode_symbols(model, buffer[..n].iter().map(|&b| b as Symbol), writer)?;
    }
}

/// Encode the end-of-stream marker with the model's current table.
pub fn encode_end_marker<M: CodingModel, W: Write>(model: &M, writer: &mut BitWriter<W>) -> Result<()> {
    encode_symbol(EOS, model.codes(), writer)
}

/// Decode symbols into `sink` until `termination` says the stream is over.
///
/// Returns the number of bytes written to `sink`.
///
/// # Errors
/// - `HuffmanError::TruncatedStream` if the bits run out first
/// - `HuffmanError::InvalidCode` if an end marker shows up in a counted stream
pub fn decode_symbols<M, R, W>(
    model: &mut M,
    reader: &mut BitReader<R>,
    termination: Termination,
    mut sink: W,
) -> Result<u64>
where
    M: CodingModel,
    R: Read,
    W: Write,
{
    let mut out = Vec::with_capacity(IO_CHUNK_SIZE);
    let mut decoded = 0u64;

    loop {
        if termination == Termination::Count(decoded) {
            break;
        }

        let position = reader.position();
        let symbol = decode_symbol(reader, model.tree())?;
        if symbol == EOS {
            if termination == Termination::EndMarker {
                break;
            }
            return Err(HuffmanError::InvalidCode { position }.into());
        }

        out.push(symbol as u8);
        model.observe(symbol)?;
        decoded += 1;

        if out.len() >= IO_CHUNK_SIZE {
            sink.write_all(&out)?;
            out.clear();
        }
    }

    sink.write_all(&out)?;
    sink.flush()?;
    Ok(decoded)
}

/// Fill `buffer` as far as a single successful read allows.
pub(crate) fn read_chunk<R: Read>(source: &mut R, buffer: &mut [u8]) -> Result<usize> {
    loop {
        match source.read(buffer) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
