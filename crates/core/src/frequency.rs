//! Symbol frequency table.
//!
//! Counts are kept for all 256 byte values plus the end-of-stream marker.
//! Symbols with a zero count are absent from any tree built from the table.

use std::fmt;

/// One coded unit: a byte value (0-255) or [`EOS`].
pub type Symbol = u16;

/// Reserved end-of-stream symbol terminating adaptive streams.
pub const EOS: Symbol = 256;

/// Number of distinct symbols, byte values plus [`EOS`].
pub const ALPHABET_SIZE: usize = 257;

/// Occurrence counts per symbol.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
    total: u64,
}

impl FrequencyTable {
    /// Create a table with every count at zero.
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
            total: 0,
        }
    }

    /// Create a table with every symbol, [`EOS`] included, at count 1.
    ///
    /// This is the adaptive seed: every symbol has a code from the start.
    pub fn uniform() -> Self {
        Self {
            counts: [1; ALPHABET_SIZE],
            total: ALPHABET_SIZE as u64,
        }
    }

    /// Count every byte of `data`. [`EOS`] stays at zero.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        for &byte in data {
            table.counts[byte as usize] += 1;
        }
        table.total = data.len() as u64;
        table
    }

    /// Add one occurrence of `symbol`.
    ///
    /// # Panics
    /// Panics if `symbol` is outside the alphabet.
    pub fn increment(&mut self, symbol: Symbol) {
        let count = &mut self.counts[symbol as usize];
        *count = count.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    /// Halve every present count, rounding down but never below 1.
    ///
    /// Zero counts stay zero so absent symbols stay absent.
    pub fn normalize(&mut self) {
        let mut total = 0u64;
        for count in self.counts.iter_mut().filter(|c| **c > 0) {
            *count = (*count / 2).max(1);
            total = total.saturating_add(*count);
        }
        self.total = total;
    }

    /// Overwrite the count of `symbol`. The total saturates at `u64::MAX`.
    pub fn set(&mut self, symbol: Symbol, count: u64) {
        let slot = &mut self.counts[symbol as usize];
        self.total = self.total.saturating_sub(*slot).saturating_add(count);
        *slot = count;
    }

    /// Count of `symbol`.
    pub fn get(&self, symbol: Symbol) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Non-zero entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, count)| (symbol as Symbol, *count))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyTable")
            .field("total", &self.total)
            .field("distinct", &self.distinct())
            .finish()
    }
}
