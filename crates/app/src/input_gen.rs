//! Sample data for demo runs.
//!
//! Without a SOURCE the tool compresses a generated buffer instead of a file.
//! The buffer is built from sections whose byte statistics differ, so both
//! the static and the adaptive coder have something to show:
//! - Runs of one byte (a near-degenerate distribution)
//! - Text over a small alphabet with English-like letter weights
//! - Bytes drawn from a skewed, roughly geometric distribution
//! - Uniform noise (nothing to gain)
//!
//! Consecutive sections use different distributions, which is where the
//! adaptive variants pull ahead of a single whole-input tree.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest section emitted before the distribution changes.
const MAX_SECTION_BYTES: usize = 16 * 1024;

const TEXT_ALPHABET: &[u8] = b"etaoinshrdlucmfwypvbgkjqxz .,\n";

/// Generate `size_bytes` of mixed data, reproducible from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = rng
            .gen_range(MAX_SECTION_BYTES / 4..=MAX_SECTION_BYTES)
            .min(size_bytes - data.len());

        match rng.gen_range(0..10) {
            0..=1 => {
                let byte: u8 = rng.gen();
                data.resize(data.len() + section, byte);
            }
            2..=5 => push_text(&mut rng, &mut data, section),
            6..=8 => push_skewed(&mut rng, &mut data, section),
            _ => data.extend((0..section).map(|_| rng.gen::<u8>())),
        }
    }

    data
}

/// Letters early in the alphabet are picked more often (index ~ min of two draws).
fn push_text(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, len: usize) {
    for _ in 0..len {
        let a = rng.gen_range(0..TEXT_ALPHABET.len());
        let b = rng.gen_range(0..TEXT_ALPHABET.len());
        data.push(TEXT_ALPHABET[a.min(b)]);
    }
}

/// Geometric-like distribution around a random base byte.
fn push_skewed(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, len: usize) {
    let base: u8 = rng.gen();
    for _ in 0..len {
        let mut offset = 0u8;
        while offset < 15 && rng.gen_bool(0.5) {
            offset += 1;
        }
        data.push(base.wrapping_add(offset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_length() {
        for size in [0, 1, 100, 4096, 50_000] {
            assert_eq!(generate_sample_data(999, size).len(), size);
        }
    }

    #[test]
    fn test_determinism() {
        assert_eq!(generate_sample_data(12345, 40_000), generate_sample_data(12345, 40_000));
        assert_ne!(generate_sample_data(1, 40_000), generate_sample_data(2, 40_000));
    }

    #[test]
    fn test_distribution_is_skewed() {
        let data = generate_sample_data(42, 200_000);
        let mut counts = [0usize; 256];
        for &byte in &data {
            counts[byte as usize] += 1;
        }
        counts.sort_unstable_by(|a, b| b.cmp(a));

        // Uniform data would put 1/16 of the bytes in the top 16 values
        let top: usize = counts[..16].iter().sum();
        assert!(top > data.len() / 8);
    }
}
