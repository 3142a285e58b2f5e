//! Adaptive Huffman controller.
//!
//! The controller owns the frequency table, the current tree and the code
//! table derived from it. After every coded symbol both the encoder and the
//! decoder call [`AdaptiveController::observe`], which bumps the symbol's
//! count and, depending on the [`Strategy`], rebuilds the tree. Nothing about
//! the tree is transmitted: the two sides stay in lockstep because they start
//! from the same seed and apply the same updates in the same order.
//!
//! # Seed
//!
//! Every controller starts from [`FrequencyTable::uniform`]: all 256 byte
//! values and the end-of-stream symbol at count 1. Every symbol therefore has
//! a code at all times and no escape mechanism is needed.
//!
//! # Strategies
//!
//! - **Freeze**: the tree is built once and never again. With `after == 0`
//!   the seed tree is final; otherwise the single rebuild happens when the
//!   `after`-th symbol is observed.
//! - **Reconstruct**: rebuild every `interval` observed symbols.
//! - **Normalize**: rebuild every `interval` symbols, and whenever the total
//!   count exceeds `threshold` halve all counts
//!   ([`FrequencyTable::normalize`]) and rebuild immediately. The total never
//!   exceeds `threshold + 1`.
//!
//! Strategy and parameters are not stored in the stream. Decoding with a
//! different configuration than encoding is undetectable here and produces
//! garbage or a stream error.

use std::fmt;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, Symbol, ALPHABET_SIZE};
use crate::model::CodingModel;
use crate::tree::{CodeTable, HuffmanTree};

/// Default reconstruct interval.
pub const DEFAULT_RECONSTRUCT_INTERVAL: u64 = 256;

/// Default freeze point: symbols counted before the single rebuild.
pub const DEFAULT_FREEZE_AFTER: u64 = 1024;

/// Default normalization threshold.
pub const DEFAULT_NORMALIZE_THRESHOLD: u64 = 1 << 15;

/// Smallest accepted normalization threshold.
///
/// Halving a table whose total just passed the threshold must land below
/// the threshold again, which needs room for the 257 seeded counts.
pub const MIN_NORMALIZE_THRESHOLD: u64 = 4 * ALPHABET_SIZE as u64;

/// When the adaptive tree is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Build once, after `after` symbols (0 = keep the seed tree)
    Freeze { after: u64 },
    /// Rebuild every `interval` symbols
    Reconstruct { interval: u64 },
    /// Rebuild every `interval` symbols, halving counts past `threshold`
    Normalize { threshold: u64, interval: u64 },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Freeze { after } => write!(f, "freeze after {after} symbols"),
            Strategy::Reconstruct { interval } => {
                write!(f, "reconstruct every {interval} symbols")
            }
            Strategy::Normalize {
                threshold,
                interval,
            } => write!(
                f,
                "normalize above {threshold} (rebuild every {interval} symbols)"
            ),
        }
    }
}

/// Parameters both ends of an adaptive stream must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveConfig {
    pub strategy: Strategy,
}

impl AdaptiveConfig {
    pub fn freeze(after: u64) -> Self {
        Self {
            strategy: Strategy::Freeze { after },
        }
    }

    pub fn reconstruct(interval: u64) -> Self {
        Self {
            strategy: Strategy::Reconstruct { interval },
        }
    }

    /// Normalize above `threshold`, rebuilding after every symbol.
    pub fn normalize(threshold: u64) -> Self {
        Self::normalize_every(threshold, 1)
    }

    pub fn normalize_every(threshold: u64, interval: u64) -> Self {
        Self {
            strategy: Strategy::Normalize {
                threshold,
                interval,
            },
        }
    }

    /// Reject parameters that cannot drive a stream.
    pub fn validate(&self) -> Result<()> {
        match self.strategy {
            Strategy::Freeze { .. } => Ok(()),
            Strategy::Reconstruct { interval } => {
                if interval == 0 {
                    return Err(Error::Config("reconstruct interval must be at least 1".into()));
                }
                Ok(())
            }
            Strategy::Normalize {
                threshold,
                interval,
            } => {
                if interval == 0 {
                    return Err(Error::Config("normalize interval must be at least 1".into()));
                }
                if threshold < MIN_NORMALIZE_THRESHOLD {
                    return Err(Error::Config(format!(
                        "normalize threshold {threshold} is below the minimum {MIN_NORMALIZE_THRESHOLD}"
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self::reconstruct(DEFAULT_RECONSTRUCT_INTERVAL)
    }
}

/// Adaptive coding state for one stream.
#[derive(Debug, Clone)]
pub struct AdaptiveController {
    strategy: Strategy,
    frequencies: FrequencyTable,
    tree: HuffmanTree,
    codes: CodeTable,
    /// Symbols observed since the last rebuild
    since_rebuild: u64,
    /// Symbols observed since construction
    observed: u64,
    rebuilds: u64,
    normalizations: u64,
    /// Freeze strategy only: the final tree is in place
    frozen: bool,
}

impl AdaptiveController {
    /// Create a controller holding the seed tree.
    ///
    /// # Errors
    /// `Error::Config` if `config` fails [`AdaptiveConfig::validate`].
    pub fn new(config: &AdaptiveConfig) -> Result<Self> {
        config.validate()?;

        let frequencies = FrequencyTable::uniform();
        let tree = HuffmanTree::build(&frequencies)?;
        let codes = tree.code_table()?;

        Ok(Self {
            strategy: config.strategy,
            frequencies,
            tree,
            codes,
            since_rebuild: 0,
            observed: 0,
            rebuilds: 0,
            normalizations: 0,
            frozen: matches!(config.strategy, Strategy::Freeze { after: 0 }),
        })
    }

    /// Count `symbol` and apply the strategy.
    ///
    /// Must be called right after `symbol` is encoded or decoded.
    pub fn observe(&mut self, symbol: Symbol) -> Result<()> {
        self.frequencies.increment(symbol);
        self.observed += 1;
        self.since_rebuild += 1;

        match self.strategy {
            Strategy::Freeze { after } => {
                if !self.frozen && self.observed >= after {
                    self.rebuild()?;
                    self.frozen = true;
                    debug!("tree frozen after {} symbols", self.observed);
                }
            }
            Strategy::Reconstruct { interval } => {
                if self.since_rebuild >= interval {
                    self.rebuild()?;
                }
            }
            Strategy::Normalize {
                threshold,
                interval,
            } => {
                if self.frequencies.total() > threshold {
                    self.frequencies.normalize();
                    self.normalizations += 1;
                    debug!(
                        "normalized frequencies at symbol {}: total now {}",
                        self.observed,
                        self.frequencies.total()
                    );
                    self.rebuild()?;
                } else if self.since_rebuild >= interval {
                    self.rebuild()?;
                }
            }
        }

        Ok(())
    }

    fn rebuild(&mut self) -> Result<()> {
        self.tree = HuffmanTree::build(&self.frequencies)?;
        self.codes = self.tree.code_table()?;
        self.rebuilds += 1;
        self.since_rebuild = 0;
        trace!(
            "rebuild {} at symbol {} (total weight {})",
            self.rebuilds,
            self.observed,
            self.tree.weight()
        );
        Ok(())
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Symbols observed since construction.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Rebuilds since construction; the seed build is not counted.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn normalization_count(&self) -> u64 {
        self.normalizations
    }

    /// Whether a freeze strategy has built its final tree.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl CodingModel for AdaptiveController {
    fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    fn codes(&self) -> &CodeTable {
        &self.codes
    }

    fn observe(&mut self, symbol: Symbol) -> Result<()> {
        AdaptiveController::observe(self, symbol)
    }

    fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn normalization_count(&self) -> u64 {
        self.normalizations
    }
}
