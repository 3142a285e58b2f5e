//! Huffman tree construction and code table derivation.
//!
//! The tree lives in an arena: nodes are stored in a `Vec` and refer to each
//! other by [`NodeId`]. Rebuilding means building a fresh arena and dropping
//! the old one.
//!
//! # Tie-break rule
//!
//! Encoder and decoder must build identical trees from identical tables, so
//! every merge decision is a pure function of the frequencies:
//!
//! - Nodes are ordered by `(weight, order)`, smallest first.
//! - A leaf's `order` is its symbol value (0-256).
//! - The k-th internal node created (k = 0, 1, 2, ...) gets `order = 257 + k`.
//! - Each merge pops the two smallest nodes; the first becomes the left
//!   child (bit `0`), the second the right child (bit `1`).
//!
//! Orders are unique, so there is never a true tie.
//!
//! A table with a single present symbol yields a one-leaf tree whose code is
//! the single bit `0`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use crate::error::{HuffmanError, Result};
use crate::frequency::{FrequencyTable, Symbol, ALPHABET_SIZE};

/// Longest code word a [`Code`] can hold.
pub const MAX_CODE_LEN: usize = 64;

/// Index of a node in a [`HuffmanTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Leaf or internal node payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { symbol: Symbol },
    Internal { left: NodeId, right: NodeId },
}

/// One node of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Symbol count for a leaf, sum of the children for an internal node
    pub weight: u64,
    pub kind: NodeKind,
    /// Non-owning back link; `None` for the root
    pub parent: Option<NodeId>,
}

/// A binary prefix-code tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Leaf node per symbol, for upward walks
    leaves: Vec<Option<NodeId>>,
}

impl HuffmanTree {
    /// Build a tree from every symbol with a non-zero count.
    ///
    /// # Errors
    /// `HuffmanError::EmptyFrequencyTable` if no symbol is present.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        let distinct = frequencies.distinct();
        let mut nodes = Vec::with_capacity(distinct.saturating_mul(2));
        let mut leaves = vec![None; ALPHABET_SIZE];
        let mut heap = BinaryHeap::with_capacity(distinct);

        for (symbol, weight) in frequencies.iter() {
            let id = NodeId(nodes.len() as u32);
            nodes.push(Node {
                weight,
                kind: NodeKind::Leaf { symbol },
                parent: None,
            });
            leaves[symbol as usize] = Some(id);
            heap.push(Reverse((weight, symbol as u32, id)));
        }

        let mut next_order = ALPHABET_SIZE as u32;
        let root = loop {
            let Reverse((left_weight, _, left)) =
                heap.pop().ok_or(HuffmanError::EmptyFrequencyTable)?;
            let Some(Reverse((right_weight, _, right))) = heap.pop() else {
                break left;
            };

            let id = NodeId(nodes.len() as u32);
            let weight = left_weight.saturating_add(right_weight);
            nodes.push(Node {
                weight,
                kind: NodeKind::Internal { left, right },
                parent: None,
            });
            nodes[left.index()].parent = Some(id);
            nodes[right.index()].parent = Some(id);

            heap.push(Reverse((weight, next_order, id)));
            next_order += 1;
        };

        Ok(Self { nodes, root, leaves })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Total weight at the root.
    pub fn weight(&self) -> u64 {
        self.node(self.root).weight
    }

    /// Number of symbols with a leaf in this tree.
    pub fn leaf_count(&self) -> usize {
        self.leaves.iter().filter(|leaf| leaf.is_some()).count()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.leaf_of(symbol).is_some()
    }

    /// Code length of `symbol`, found by walking parent links up to the root.
    ///
    /// A lone root leaf reports depth 1, the length of its `0` code.
    pub fn depth_of(&self, symbol: Symbol) -> Option<usize> {
        let mut current = self.leaf_of(symbol)?;
        let mut depth = 0;
        while let Some(parent) = self.node(current).parent {
            depth += 1;
            current = parent;
        }
        Some(depth.max(1))
    }

    /// Derive the code of every leaf: left edge `0`, right edge `1`.
    ///
    /// # Errors
    /// `HuffmanError::CodeTooLong` if some leaf is deeper than [`MAX_CODE_LEN`].
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut table = CodeTable::empty();

        if let NodeKind::Leaf { symbol } = self.node(self.root).kind {
            table.codes[symbol as usize] = Some(Code::new(0, 1));
            return Ok(table);
        }

        let mut stack = vec![(self.root, 0u64, 0usize)];
        while let Some((id, bits, len)) = stack.pop() {
            match self.node(id).kind {
                NodeKind::Leaf { symbol } => {
                    table.codes[symbol as usize] = Some(Code::new(bits, len as u8));
                }
                NodeKind::Internal { left, right } => {
                    if len == MAX_CODE_LEN {
                        return Err(HuffmanError::CodeTooLong {
                            length: len + 1,
                            max: MAX_CODE_LEN,
                        }
                        .into());
                    }
                    stack.push((right, (bits << 1) | 1, len + 1));
                    stack.push((left, bits << 1, len + 1));
                }
            }
        }

        Ok(table)
    }

    fn leaf_of(&self, symbol: Symbol) -> Option<NodeId> {
        self.leaves.get(symbol as usize).copied().flatten()
    }
}

/// A code word of up to 64 bits, right-aligned in `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u64,
    len: u8,
}

impl Code {
    pub fn new(bits: u64, len: u8) -> Self {
        debug_assert!(len as usize <= MAX_CODE_LEN);
        Self { bits, len }
    }

    pub fn bits(self) -> u64 {
        self.bits
    }

    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Whether `self` is a proper or equal prefix of `other`.
    pub fn is_prefix_of(self, other: Code) -> bool {
        if self.len > other.len {
            return false;
        }
        if self.len == 0 {
            return true;
        }
        other.bits >> (other.len - self.len) == self.bits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            f.write_str(if (self.bits >> i) & 1 == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to code word mapping derived from a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; ALPHABET_SIZE],
}

impl CodeTable {
    fn empty() -> Self {
        Self {
            codes: [None; ALPHABET_SIZE],
        }
    }

    pub fn get(&self, symbol: Symbol) -> Option<Code> {
        self.codes.get(symbol as usize).copied().flatten()
    }

    /// Present entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as Symbol, c)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that no code word is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<Code> = self.iter().map(|(_, code)| code).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(*b))
        })
    }

    /// Expected encoded size in bits of data with these frequencies.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|c| c.len() as u64 * count))
            .sum()
    }
}
