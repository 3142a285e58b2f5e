//! huffstream-core: static and adaptive Huffman coding over byte streams
//!
//! This library compresses and decompresses arbitrary byte streams with
//! binary Huffman trees, in two variants:
//! - **Static**: one tree built from the whole input and shipped in a small
//!   CRC-protected header
//! - **Adaptive**: the tree evolves while streaming; encoder and decoder
//!   rebuild it in lockstep, so no tree data is transmitted
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitio`: Low-level bit reading/writing over `io::Read` / `io::Write`
//! - `frequency`: Symbol frequency table with normalization
//! - `tree`: Deterministic Huffman tree builder and code tables
//! - `codec`: Per-symbol encode/decode
//! - `model`: Build schedules (static vs adaptive)
//! - `adaptive`: Freeze / reconstruct / normalize update policies
//! - `driver`: Symbol-at-a-time stream loop shared by both directions
//! - `framing`: Static container format
//! - `stream`: `compress` / `decompress` entry points
//! - `metrics`: Per-run statistics
//!
//! # Example
//! ```
//! use huffstream_core::{compress_bytes, decompress_bytes, AdaptiveConfig, Config};
//!
//! let config = Config::Adaptive(AdaptiveConfig::reconstruct(64));
//! let packed = compress_bytes(b"abracadabra", &config).unwrap();
//! assert_eq!(decompress_bytes(&packed, &config).unwrap(), b"abracadabra");
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Bounded memory**: Adaptive streams move through fixed-size buffers
//! - **Deterministic**: Tree construction has a fixed tie-break rule, so any
//!   two runs with the same input and configuration produce identical bytes

pub mod adaptive;
pub mod bitio;
pub mod codec;
pub mod driver;
pub mod error;
pub mod framing;
pub mod frequency;
pub mod metrics;
pub mod model;
pub mod stream;
pub mod tree;

// Re-export commonly used types
pub use adaptive::{AdaptiveConfig, AdaptiveController, Strategy};
pub use error::{Error, Result};
pub use frequency::{FrequencyTable, Symbol, EOS};
pub use metrics::CodecStats;
pub use model::{CodingModel, StaticModel};
pub use stream::{compress, compress_bytes, decompress, decompress_bytes, Config};
pub use tree::{Code, CodeTable, HuffmanTree};
