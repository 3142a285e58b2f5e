//! Bit-level I/O over byte streams.
//!
//! This module provides BitWriter and BitReader for serializing Huffman codes.
//! Both operate in MSB-first (most significant bit first) order.
//!
//! Both sides move bytes through a fixed-size buffer so memory stays bounded
//! on large inputs. Buffer boundaries are invisible to callers: reading the
//! same stream with any buffer capacity yields the same bits.
//!
//! # Padding Rules
//! - BitWriter: pads the final incomplete byte with trailing zeros
//! - BitReader: cannot tell padding from data; callers stop on a known
//!   symbol count or an end-of-stream symbol
//!
//! # Example
//! ```
//! use huffstream_core::bitio::{BitReader, BitWriter};
//! use huffstream_core::Code;
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_code(Code::new(0b110, 3)).unwrap();
//! writer.write_bit(true).unwrap();
//! // 1101, then four bits of zero padding
//! assert_eq!(writer.finish().unwrap(), vec![0b1101_0000]);
//!
//! let mut reader = BitReader::new(&[0b1101_0000u8][..]);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1101);
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::error::{BitIoError, Result};
use crate::tree::Code;

/// Default size of the byte buffers used by readers and writers.
pub const IO_CHUNK_SIZE: usize = 64 * 1024;

/// Writes bits MSB-first into an `io::Write` sink.
///
/// Accumulates bits in a one-byte buffer, collects complete bytes in a
/// pending buffer and hands them to the sink whenever it fills up.
///
/// # Invariants
/// - `bit_count` is always < 8
/// - `pending.len()` stays below `chunk_size` between calls
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Destination of completed bytes
    inner: W,
    /// Completed bytes not yet handed to `inner`
    pending: Vec<u8>,
    /// Flush threshold for `pending`
    chunk_size: usize,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
    /// Bytes already handed to `inner`
    flushed: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter with the default buffer size.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(IO_CHUNK_SIZE, inner)
    }

    /// Create a new BitWriter that flushes every `chunk_size` bytes.
    pub fn with_capacity(chunk_size: usize, inner: W) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            inner,
            pending: Vec::with_capacity(chunk_size),
            chunk_size,
            bit_buffer: 0,
            bit_count: 0,
            flushed: 0,
        }
    }

    /// Write up to 64 bits to the output.
    ///
    /// Bits are written MSB-first. For example, writing value=0b101 with count=3
    /// writes bits 1, 0, 1 in that order.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64, or the sink's
    /// I/O error if a flush fails.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        let mut val = if count == 64 { value } else { value & ((1u64 << count) - 1) };

        while remaining > 0 {
            // How many bits fit into the current byte?
            let bits_to_write = remaining.min(8 - self.bit_count as usize);

            // Extract the top bits_to_write bits from val
            let shift = remaining - bits_to_write;
            let bits = ((val >> shift) & ((1u64 << bits_to_write) - 1)) as u8;

            self.bit_buffer |= bits << (8 - self.bit_count as usize - bits_to_write);
            self.bit_count += bits_to_write as u8;

            if self.bit_count == 8 {
                self.push_byte(self.bit_buffer)?;
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            val &= (1u64 << shift) - 1;
            remaining -= bits_to_write;
        }

        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Write a Huffman code word.
    pub fn write_code(&mut self, code: Code) -> Result<()> {
        self.write_bits(code.bits(), code.len())
    }

    /// Append whole bytes, bit-aligned to the current position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.bit_count == 0 {
            for &byte in bytes {
                self.push_byte(byte)?;
            }
            return Ok(());
        }
        for &byte in bytes {
            self.write_bits(byte as u64, 8)?;
        }
        Ok(())
    }

    /// Finish writing: pad the last byte with zeros, flush, and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.bit_count > 0 {
            self.pending.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
        self.flush_pending()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Return the number of complete bytes written so far.
    pub fn byte_len(&self) -> u64 {
        self.flushed + self.pending.len() as u64
    }

    /// Return the total number of bits written (including partial byte).
    pub fn bit_len(&self) -> u64 {
        self.byte_len() * 8 + self.bit_count as u64
    }

    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.pending.push(byte);
        if self.pending.len() >= self.chunk_size {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(&self.pending)?;
            self.flushed += self.pending.len() as u64;
            self.pending.clear();
        }
        Ok(())
    }
}

/// Reads bits MSB-first from an `io::Read` source.
///
/// The source is pulled in chunks of up to `chunk_size` bytes. Padding bits
/// at the end of the stream are indistinguishable from data.
///
/// # Invariants
/// - `pos <= filled <= buffer.len()`
/// - `bits_left` is the number of unread bits in `current` (0-8)
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    buffer: Box<[u8]>,
    /// Next unread byte in `buffer`
    pos: usize,
    /// Number of valid bytes in `buffer`
    filled: usize,
    /// Byte currently being consumed
    current: u8,
    bits_left: u8,
    /// Bits consumed so far
    position: u64,
    eof: bool,
}

impl<R: Read> BitReader<R> {
    /// Create a new BitReader with the default buffer size.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(IO_CHUNK_SIZE, inner)
    }

    /// Create a new BitReader that reads `chunk_size` bytes at a time.
    pub fn with_capacity(chunk_size: usize, inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0u8; chunk_size.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            current: 0,
            bits_left: 0,
            position: 0,
            eof: false,
        }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// - `BitIoError::UnexpectedEof` if the source is exhausted
    /// - the source's I/O error, unchanged
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.bits_left = 8;
                }
                None => return Err(BitIoError::UnexpectedEof.into()),
            }
        }

        self.bits_left -= 1;
        self.position += 1;
        Ok((self.current >> self.bits_left) & 1 == 1)
    }

    /// Read up to 64 bits from the input, MSB-first.
    ///
    /// Reading 3 bits from byte 0b10110000 returns 0b101.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::UnexpectedEof` if not enough bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut result = 0u64;
        for _ in 0..count {
            result = (result << 1) | self.read_bit()? as u64;
        }
        Ok(result)
    }

    /// Return the number of bits consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Check whether every bit of the source has been consumed.
    ///
    /// May pull the next chunk from the source to find out.
    pub fn at_end(&mut self) -> Result<bool> {
        if self.bits_left > 0 || self.pos < self.filled {
            return Ok(false);
        }
        self.fill()?;
        Ok(self.pos >= self.filled)
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.pos >= self.filled {
            self.fill()?;
            if self.pos >= self.filled {
                return Ok(None);
            }
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    fn fill(&mut self) -> Result<()> {
        if self.eof {
            return Ok(());
        }
        self.pos = 0;
        self.filled = 0;
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.filled = n;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
