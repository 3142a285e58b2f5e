//! Static-variant container serialization and parsing.
//!
//! A static frame packages the packed code bits with everything the decoder
//! needs to rebuild the identical tree: the whole-input frequency table and
//! the original length.
//!
//! # Frame Format
//!
//! ```text
//! +------------------+
//! | Magic (4 bytes)  |  0x48 0x55 0x46 0x53 ("HUFS")
//! +------------------+
//! | version (1)      |  currently 1
//! +------------------+
//! | raw_len (8)      |  u64 little-endian, original byte count
//! +------------------+
//! | entries (2)      |  u16 number of frequency entries (0-256)
//! +------------------+
//! | payload_len (8)  |  u64 packed payload bytes
//! +------------------+
//! | crc32 (4)        |  u32 checksum of everything after the magic
//! +------------------+
//! | frequency table  |  entries x (symbol u8, count u64 LE),
//! | (variable)       |  strictly ascending symbol order
//! +------------------+
//! | payload          |  code bits, MSB-first, zero padded
//! | (variable)       |
//! +------------------+
//! ```
//!
//! # CRC Coverage
//!
//! The CRC32 covers version, raw_len, entries, payload_len, the frequency
//! table and the payload.
//!
//! Empty input produces a header-only frame with no entries and no payload.

use std::io::Write;

use log::debug;

use crate::bitio::{BitReader, BitWriter, IO_CHUNK_SIZE};
use crate::driver::{decode_symbols, encode_symbols, Termination};
use crate::error::{Error, FramingError, HuffmanError, Result};
use crate::frequency::{FrequencyTable, Symbol};
use crate::model::StaticModel;

/// Magic number for static frames: "HUFS" (Huffman static)
pub const MAGIC: [u8; 4] = [0x48, 0x55, 0x46, 0x53];

/// Current container version
pub const VERSION: u8 = 1;

/// Size of the fixed frame header in bytes
pub const HEADER_SIZE: usize = 27;

/// Size of one frequency table entry in bytes
const ENTRY_SIZE: usize = 9;

/// A parsed static frame.
#[derive(Debug, Clone)]
pub struct StaticFrame {
    /// Original uncompressed length
    pub raw_len: u64,

    /// Whole-input frequencies the tree is rebuilt from
    pub frequencies: FrequencyTable,

    /// Packed code bits
    pub payload: Vec<u8>,

    /// CRC32 checksum (for validation)
    pub crc32: u32,
}

/// Serialize a static frame.
///
/// `frequencies` must only hold byte symbols; the end-of-stream marker is
/// never part of a static table.
pub fn serialize_static_frame(raw_len: u64, frequencies: &FrequencyTable, payload: &[u8]) -> Vec<u8> {
    let table = serialize_table(frequencies);
    let entries = (table.len() / ENTRY_SIZE) as u16;
    let payload_len = payload.len() as u64;

    let crc32 = compute_crc(raw_len, entries, payload_len, &table, payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + table.len() + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(VERSION);
    frame.extend_from_slice(&raw_len.to_le_bytes());
    frame.extend_from_slice(&entries.to_le_bytes());
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&crc32.to_le_bytes());
    frame.extend_from_slice(&table);
    frame.extend_from_slice(payload);
    frame
}

/// Parse a static frame from bytes.
///
/// # Errors
/// - `FramingError::InvalidMagic` / `UnsupportedVersion` for foreign input
/// - `FramingError::FrameTooShort` / `PayloadLengthMismatch` for bad sizes
/// - `Error::Crc` if CRC validation fails
/// - `FramingError::DuplicateSymbol` / `FrequencySumMismatch` for an
///   inconsistent frequency table
pub fn parse_static_frame(bytes: &[u8]) -> Result<StaticFrame> {
    if bytes.len() < HEADER_SIZE {
        return Err(FramingError::FrameTooShort {
            required: HEADER_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if magic != MAGIC {
        return Err(FramingError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let version = bytes[4];
    if version != VERSION {
        return Err(FramingError::UnsupportedVersion(version).into());
    }

    let raw_len = read_u64(&bytes[5..13]);
    let entries = u16::from_le_bytes([bytes[13], bytes[14]]);
    let payload_len = read_u64(&bytes[15..23]);
    let crc32 = u32::from_le_bytes([bytes[23], bytes[24], bytes[25], bytes[26]]);

    let table_end = HEADER_SIZE + entries as usize * ENTRY_SIZE;
    if bytes.len() < table_end {
        return Err(FramingError::FrameTooShort {
            required: table_end,
            actual: bytes.len(),
        }
        .into());
    }

    let actual_payload = (bytes.len() - table_end) as u64;
    if actual_payload != payload_len {
        if actual_payload < payload_len {
            return Err(FramingError::FrameTooShort {
                required: table_end.saturating_add(payload_len as usize),
                actual: bytes.len(),
            }
            .into());
        }
        return Err(FramingError::PayloadLengthMismatch {
            expected: payload_len,
            actual: actual_payload,
        }
        .into());
    }

    let table = &bytes[HEADER_SIZE..table_end];
    let payload = &bytes[table_end..];

    let computed_crc = compute_crc(raw_len, entries, payload_len, table, payload);
    if computed_crc != crc32 {
        return Err(Error::Crc {
            expected: crc32,
            actual: computed_crc,
        });
    }

    let frequencies = deserialize_table(table)?;
    if frequencies.total() != raw_len {
        return Err(FramingError::FrequencySumMismatch {
            sum: frequencies.total(),
            raw_len,
        }
        .into());
    }

    debug!(
        "parsed static frame: {} bytes, {} symbols, {} payload bytes",
        raw_len, entries, payload_len
    );

    Ok(StaticFrame {
        raw_len,
        frequencies,
        payload: payload.to_vec(),
        crc32,
    })
}

/// Compress `raw_data` with one whole-input tree and build a frame.
pub fn compress_and_frame(raw_data: &[u8]) -> Result<Vec<u8>> {
    let frequencies = FrequencyTable::from_bytes(raw_data);
    if raw_data.is_empty() {
        return Ok(serialize_static_frame(0, &frequencies, &[]));
    }

    let mut model = StaticModel::new(&frequencies)?;
    let mut writer = BitWriter::new(Vec::new());
    encode_symbols(&mut model, raw_data.iter().map(|&b| b as Symbol), &mut writer)?;
    let payload = writer.finish()?;

    Ok(serialize_static_frame(
        raw_data.len() as u64,
        &frequencies,
        &payload,
    ))
}

/// Decode a parsed frame into `sink`. Returns the number of bytes written.
pub fn decompress_frame_into<W: Write>(frame: &StaticFrame, mut sink: W) -> Result<u64> {
    if frame.raw_len == 0 {
        sink.flush()?;
        return Ok(0);
    }

    let mut model = StaticModel::new(&frame.frequencies)?;
    let mut reader = BitReader::new(&frame.payload[..]);
    let written = decode_symbols(
        &mut model,
        &mut reader,
        Termination::Count(frame.raw_len),
        sink,
    )?;

    if written != frame.raw_len {
        return Err(HuffmanError::LengthMismatch {
            expected: frame.raw_len,
            actual: written,
        }
        .into());
    }
    Ok(written)
}

/// Decode a parsed frame into memory.
pub fn decompress_frame(frame: &StaticFrame) -> Result<Vec<u8>> {
    // raw_len is untrusted until decoding succeeds
    let mut out = Vec::with_capacity(frame.raw_len.min(IO_CHUNK_SIZE as u64) as usize);
    decompress_frame_into(frame, &mut out)?;
    Ok(out)
}

fn serialize_table(frequencies: &FrequencyTable) -> Vec<u8> {
    let mut table = Vec::with_capacity(frequencies.distinct() * ENTRY_SIZE);
    for (symbol, count) in frequencies.iter() {
        debug_assert!(symbol <= u8::MAX as Symbol);
        table.push(symbol as u8);
        table.extend_from_slice(&count.to_le_bytes());
    }
    table
}

fn deserialize_table(table: &[u8]) -> Result<FrequencyTable> {
    let mut frequencies = FrequencyTable::new();
    let mut previous: Option<u8> = None;
    let mut sum = 0u64;

    for entry in table.chunks_exact(ENTRY_SIZE) {
        let symbol = entry[0];
        if previous.is_some_and(|p| p >= symbol) {
            return Err(FramingError::DuplicateSymbol { symbol }.into());
        }
        previous = Some(symbol);

        let count = read_u64(&entry[1..]);
        sum = sum
            .checked_add(count)
            .ok_or(FramingError::FrequencyOverflow { symbol })?;
        frequencies.set(symbol as Symbol, count);
    }

    Ok(frequencies)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

/// Compute CRC32 over the protected fields.
fn compute_crc(raw_len: u64, entries: u16, payload_len: u64, table: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();

    hasher.update(&[VERSION]);
    hasher.update(&raw_len.to_le_bytes());
    hasher.update(&entries.to_le_bytes());
    hasher.update(&payload_len.to_le_bytes());

    hasher.update(table);
    hasher.update(payload);

    hasher.finalize()
}
