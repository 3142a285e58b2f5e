//! Per-symbol bit codec.
//!
//! Encoding looks a symbol up in the current [`CodeTable`] and appends its
//! code word to a [`BitWriter`]. Decoding walks the current [`HuffmanTree`]
//! from the root, one bit per edge (0 = left, 1 = right), until it reaches a
//! leaf.

use std::io::{Read, Write};

use crate::bitio::{BitReader, BitWriter};
use crate::error::{BitIoError, Error, HuffmanError, Result};
use crate::frequency::Symbol;
use crate::tree::{CodeTable, HuffmanTree, NodeKind};

/// Append the code word of `symbol` to `writer`.
///
/// # Errors
/// `HuffmanError::UnknownSymbol` if `symbol` has no code in `codes`.
pub fn encode_symbol<W: Write>(
    symbol: Symbol,
    codes: &CodeTable,
    writer: &mut BitWriter<W>,
) -> Result<()> {
    let code = codes
        .get(symbol)
        .ok_or(HuffmanError::UnknownSymbol { symbol })?;
    writer.write_code(code)
}

/// Read one symbol from `reader` by walking `tree`.
///
/// # Errors
/// - `HuffmanError::TruncatedStream` if bits run out before a leaf
/// - `HuffmanError::InvalidCode` if a one-leaf tree reads a `1`
pub fn decode_symbol<R: Read>(reader: &mut BitReader<R>, tree: &HuffmanTree) -> Result<Symbol> {
    let mut current = tree.root();

    if let NodeKind::Leaf { symbol } = tree.node(current).kind {
        let position = reader.position();
        return if next_bit(reader)? {
            Err(HuffmanError::InvalidCode { position }.into())
        } else {
            Ok(symbol)
        };
    }

    loop {
        match tree.node(current).kind {
            NodeKind::Leaf { symbol } => return Ok(symbol),
            NodeKind::Internal { left, right } => {
                current = if next_bit(reader)? { right } else { left };
            }
        }
    }
}

fn next_bit<R: Read>(reader: &mut BitReader<R>) -> Result<bool> {
    let position = reader.position();
    reader.read_bit().map_err(|err| match err {
        Error::BitIo(BitIoError::UnexpectedEof) => HuffmanError::TruncatedStream { position }.into(),
        other => other,
    })
}
