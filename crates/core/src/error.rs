//! Error types for huffstream.
//!
//! All operations return structured errors rather than panicking.
//! Stream corruption, policy bugs and I/O failures each get their own
//! variant so callers can tell them apart.

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits from/to byte streams
/// - Huffman: tree construction or encode/decode failures
/// - Framing: static container header parsing
/// - CRC: static container corruption detected
/// - I/O: failures of the caller's source or sink, propagated unchanged
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of stream)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman codec error (e.g., unknown symbol, truncated stream)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Static container error (e.g., invalid header, length mismatch)
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// Source or sink I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration (e.g., zero reconstruct interval)
    #[error("configuration error: {0}")]
    Config(String),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the stream
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// No symbols with non-zero frequency (cannot build a tree)
    #[error("empty frequency table: cannot build tree")]
    EmptyFrequencyTable,

    /// Encoder asked for a symbol that has no code in the current table
    #[error("symbol {symbol} has no code in the current table")]
    UnknownSymbol { symbol: u16 },

    /// Bits ran out before the tree walk reached a leaf
    #[error("stream truncated at bit position {position}")]
    TruncatedStream { position: u64 },

    /// Bit sequence that leads nowhere in the current tree
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: u64 },

    /// Tree depth exceeds what a code word can hold
    #[error("code length {length} exceeds maximum {max}")]
    CodeTooLong { length: usize, max: usize },

    /// Decoded length doesn't match the expected length
    #[error("decoded length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: u64, actual: u64 },
}

/// Static container errors.
#[derive(Debug, Error)]
pub enum FramingError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Header version this build does not understand
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u8),

    /// Container is too short to contain what its header promises
    #[error("frame too short: need at least {required} bytes, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// Payload length disagrees with the header
    #[error("payload length mismatch: header says {expected}, got {actual}")]
    PayloadLengthMismatch { expected: u64, actual: u64 },

    /// The frequency table lists the same symbol twice or out of order
    #[error("frequency table entry for symbol {symbol} is duplicated or out of order")]
    DuplicateSymbol { symbol: u8 },

    /// Header frequencies don't add up to the recorded length
    #[error("frequency table sums to {sum}, header records {raw_len} symbols")]
    FrequencySumMismatch { sum: u64, raw_len: u64 },

    /// Header frequencies add up past `u64::MAX`
    #[error("frequency table total overflows at symbol {symbol}")]
    FrequencyOverflow { symbol: u8 },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error means the compressed input is corrupt or incomplete,
    /// as opposed to a caller or I/O problem.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            Error::Crc { .. }
                | Error::Framing(_)
                | Error::BitIo(BitIoError::UnexpectedEof)
                | Error::Huffman(HuffmanError::TruncatedStream { .. })
                | Error::Huffman(HuffmanError::InvalidCode { .. })
                | Error::Huffman(HuffmanError::LengthMismatch { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err: Error = HuffmanError::UnknownSymbol { symbol: 65 }.into();
        assert_eq!(
            err.to_string(),
            "huffman codec error: symbol 65 has no code in the current table"
        );

        let err = Error::Crc {
            expected: 0xdeadbeef,
            actual: 1,
        };
        assert_eq!(err.to_string(), "CRC mismatch: expected 0xdeadbeef, got 0x00000001");
    }

    #[test]
    fn test_corrupt_input_classification() {
        let truncated: Error = HuffmanError::TruncatedStream { position: 3 }.into();
        assert!(truncated.is_corrupt_input());

        let unknown: Error = HuffmanError::UnknownSymbol { symbol: 1 }.into();
        assert!(!unknown.is_corrupt_input());

        let io: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(!io.is_corrupt_input());
    }
}
