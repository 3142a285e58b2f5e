//! Build schedules shared by the static and adaptive variants.
//!
//! The stream driver only sees a [`CodingModel`]: something that holds the
//! current tree and code table and hears about every coded symbol. The
//! static variant builds once up front and ignores observations; the
//! adaptive variant ([`crate::adaptive::AdaptiveController`]) rebuilds on
//! its policy.

use crate::error::Result;
use crate::frequency::{FrequencyTable, Symbol};
use crate::tree::{CodeTable, HuffmanTree};

/// Current coding state, updated once per coded symbol.
///
/// Encoder and decoder must call [`CodingModel::observe`] with the same
/// symbols in the same order so both sides hold the same tree.
pub trait CodingModel {
    /// Tree used to decode the next symbol.
    fn tree(&self) -> &HuffmanTree;

    /// Code table used to encode the next symbol.
    fn codes(&self) -> &CodeTable;

    /// Record that `symbol` was just encoded or decoded.
    fn observe(&mut self, symbol: Symbol) -> Result<()>;

    /// Rebuilds performed since construction.
    fn rebuild_count(&self) -> u64 {
        0
    }

    /// Frequency normalizations performed since construction.
    fn normalization_count(&self) -> u64 {
        0
    }
}

/// One tree for the whole stream.
#[derive(Debug, Clone)]
pub struct StaticModel {
    tree: HuffmanTree,
    codes: CodeTable,
}

impl StaticModel {
    /// Build the fixed tree from a whole-input frequency table.
    pub fn new(frequencies: &FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::build(frequencies)?;
        let codes = tree.code_table()?;
        Ok(Self { tree, codes })
    }
}

impl CodingModel for StaticModel {
    fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    fn codes(&self) -> &CodeTable {
        &self.codes
    }

    fn observe(&mut self, _symbol: Symbol) -> Result<()> {
        Ok(())
    }
}
