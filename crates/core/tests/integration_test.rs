//! Integration tests for the full compress/decompress pipeline.
//!
//! These tests verify end-to-end behavior through the public API: input ->
//! compress -> decompress -> output, across both variants and every adaptive
//! strategy, plus the lockstep properties the adaptive engine depends on.

use huffstream_core::{
    adaptive::MIN_NORMALIZE_THRESHOLD,
    compress, compress_bytes, decompress, decompress_bytes,
    error::{Error, HuffmanError},
    AdaptiveConfig, AdaptiveController, Config, FrequencyTable, HuffmanTree, Symbol,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn all_configs() -> Vec<Config> {
    vec![
        Config::Static,
        Config::Adaptive(AdaptiveConfig::freeze(0)),
        Config::Adaptive(AdaptiveConfig::freeze(100)),
        Config::Adaptive(AdaptiveConfig::reconstruct(1)),
        Config::Adaptive(AdaptiveConfig::reconstruct(37)),
        Config::Adaptive(AdaptiveConfig::reconstruct(1024)),
        Config::Adaptive(AdaptiveConfig::normalize(MIN_NORMALIZE_THRESHOLD)),
        Config::Adaptive(AdaptiveConfig::normalize_every(1 << 15, 64)),
    ]
}

/// Mixed data: runs, text-like stretches and noise.
fn sample_data(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        let run = rng.gen_range(16..512).min(len - data.len());
        match rng.gen_range(0..3) {
            0 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(run));
            }
            1 => {
                let alphabet = b"etaoin shrdlu";
                data.extend((0..run).map(|_| alphabet[rng.gen_range(0..alphabet.len())]));
            }
            _ => data.extend((0..run).map(|_| rng.gen::<u8>())),
        }
    }
    data
}

#[test]
fn test_round_trip_mixed_data() {
    let data = sample_data(42, 20_000);
    for config in all_configs() {
        let compressed = compress_bytes(&data, &config).unwrap();
        let restored = decompress_bytes(&compressed, &config).unwrap();
        assert_eq!(restored, data, "round trip failed for {config:?}");
    }
}

#[test]
fn test_determinism() {
    let data = sample_data(7, 8_000);
    for config in all_configs() {
        let first = compress_bytes(&data, &config).unwrap();
        let second = compress_bytes(&data, &config).unwrap();
        assert_eq!(first, second, "{config:?} is not deterministic");
    }
}

#[test]
fn test_single_symbol_input() {
    let data = vec![0x41u8; 1000];
    for config in all_configs() {
        let compressed = compress_bytes(&data, &config).unwrap();
        assert_eq!(decompress_bytes(&compressed, &config).unwrap(), data, "{config:?}");
    }
}

#[test]
fn test_empty_input() {
    for config in all_configs() {
        let compressed = compress_bytes(b"", &config).unwrap();
        assert!(decompress_bytes(&compressed, &config).unwrap().is_empty());
    }
}

#[test]
fn test_all_byte_values() {
    let data: Vec<u8> = (0..=255u8).rev().cycle().take(256 * 8).collect();
    for config in all_configs() {
        let compressed = compress_bytes(&data, &config).unwrap();
        assert_eq!(decompress_bytes(&compressed, &config).unwrap(), data, "{config:?}");
    }
}

#[test]
fn test_streaming_io() {
    let data = sample_data(99, 150_000);
    let config = Config::Adaptive(AdaptiveConfig::reconstruct(512));

    let mut compressed = Vec::new();
    let stats = compress(std::io::Cursor::new(&data), &mut compressed, &config).unwrap();
    assert_eq!(stats.input_bytes, data.len() as u64);
    assert_eq!(stats.rebuilds, data.len() as u64 / 512);

    let mut restored = Vec::new();
    let stats = decompress(std::io::Cursor::new(&compressed), &mut restored, &config).unwrap();
    assert_eq!(stats.output_bytes, data.len() as u64);
    assert_eq!(restored, data);
}

/// Golden outputs of "abracadabra" for the documented tie-break rule, seed
/// and end marker. Any conforming encoder must produce exactly these bytes.
#[test]
fn test_golden_outputs() {
    let data = b"abracadabra";

    let reconstruct = Config::Adaptive(AdaptiveConfig::reconstruct(4));
    assert_eq!(
        compress_bytes(data, &reconstruct).unwrap(),
        vec![0x5f, 0x60, 0x70, 0x5f, 0x5d, 0xfa, 0xbd, 0xf7, 0xe3, 0xef, 0xdf, 0x30]
    );

    let freeze = Config::Adaptive(AdaptiveConfig::freeze(0));
    assert_eq!(
        compress_bytes(data, &freeze).unwrap(),
        vec![0x5f, 0x60, 0x70, 0x5f, 0x61, 0x5f, 0x62, 0x5f, 0x60, 0x70, 0x5f, 0xfe]
    );

    let normalize = Config::Adaptive(AdaptiveConfig::normalize(MIN_NORMALIZE_THRESHOLD));
    assert_eq!(
        compress_bytes(data, &normalize).unwrap(),
        vec![0x5f, 0x5f, 0x6e, 0xfc, 0x5d, 0xf8, 0xbb, 0xf3, 0xe3, 0xeb, 0xce, 0xf0]
    );

    let empty = Config::Adaptive(AdaptiveConfig::reconstruct(4));
    assert_eq!(compress_bytes(b"", &empty).unwrap(), vec![0xfe]);

    let expected_static: Vec<u8> = vec![
        0x48, 0x55, 0x46, 0x53, 0x01, // magic, version
        0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // raw_len = 11
        0x05, 0x00, // 5 entries
        0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // payload_len = 3
        0x00, 0x3b, 0x78, 0xd4, // crc32
        0x61, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // a x5
        0x62, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // b x2
        0x63, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // c x1
        0x64, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // d x1
        0x72, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // r x2
        0x6e, 0x8a, 0xdc, // payload
    ];
    let frame = compress_bytes(data, &Config::Static).unwrap();
    assert_eq!(frame.len(), 27 + 5 * 9 + 3);

    // The stored checksum covers version through payload_len, then the table and payload
    let stored = u32::from_le_bytes([frame[23], frame[24], frame[25], frame[26]]);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&frame[4..23]);
    hasher.update(&frame[27..]);
    assert_eq!(stored, hasher.finalize());
    assert_eq!(stored, 0xd478_3b00);

    assert_eq!(frame, expected_static);
}

#[test]
fn test_config_mismatch_is_not_silent() {
    let data = sample_data(1234, 4_000);
    let encoded_with = Config::Adaptive(AdaptiveConfig::reconstruct(16));
    let compressed = compress_bytes(&data, &encoded_with).unwrap();

    let others = [
        Config::Adaptive(AdaptiveConfig::reconstruct(17)),
        Config::Adaptive(AdaptiveConfig::freeze(0)),
        Config::Adaptive(AdaptiveConfig::normalize(MIN_NORMALIZE_THRESHOLD)),
    ];
    for decoded_with in others {
        match decompress_bytes(&compressed, &decoded_with) {
            Ok(restored) => assert_ne!(restored, data, "{decoded_with:?} decoded cleanly"),
            Err(err) => assert!(err.is_corrupt_input(), "unexpected error {err}"),
        }
    }
}

#[test]
fn test_truncated_streams() {
    let data = sample_data(5, 3_000);
    for config in all_configs() {
        let compressed = compress_bytes(&data, &config).unwrap();
        let cut = &compressed[..compressed.len() * 2 / 3];
        let err = decompress_bytes(cut, &config).unwrap_err();
        assert!(err.is_corrupt_input(), "{config:?}: {err}");
    }
}

#[test]
fn test_static_corruption_detected() {
    let data = sample_data(77, 2_000);
    let mut compressed = compress_bytes(&data, &Config::Static).unwrap();
    let middle = compressed.len() / 2;
    compressed[middle] ^= 0x10;

    let result = decompress_bytes(&compressed, &Config::Static);
    assert!(matches!(result, Err(Error::Crc { .. })));
}

#[test]
fn test_adaptive_stream_ends_at_marker() {
    // Bytes after the end marker are never read
    let data = b"stop at the marker";
    let config = Config::Adaptive(AdaptiveConfig::reconstruct(3));
    let mut compressed = compress_bytes(data, &config).unwrap();
    compressed.extend_from_slice(&[0xAA; 16]);
    assert_eq!(decompress_bytes(&compressed, &config).unwrap(), data);
}

#[test]
fn test_freeze_stability_through_controller() {
    let data = sample_data(3, 5_000);
    let mut controller = AdaptiveController::new(&AdaptiveConfig::freeze(250)).unwrap();

    let mut frozen = None;
    for (k, &byte) in data.iter().enumerate() {
        controller.observe(byte as Symbol).unwrap();
        if k + 1 == 250 {
            frozen = Some(controller.codes().clone());
        }
        if let Some(codes) = &frozen {
            assert_eq!(controller.codes(), codes, "table changed at symbol {}", k + 1);
        }
    }
    assert_eq!(controller.rebuild_count(), 1);
}

#[test]
fn test_unknown_symbol_cannot_happen_with_seed() {
    // Every symbol keeps a code through normalization
    let mut controller =
        AdaptiveController::new(&AdaptiveConfig::normalize(MIN_NORMALIZE_THRESHOLD)).unwrap();
    for _ in 0..5_000 {
        controller.observe(0).unwrap();
    }
    for symbol in 0..=256u16 {
        assert!(controller.codes().get(symbol).is_some());
    }
    assert!(matches!(
        HuffmanTree::build(&FrequencyTable::new()),
        Err(Error::Huffman(HuffmanError::EmptyFrequencyTable))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..600), pick in 0usize..8) {
        let config = all_configs()[pick];
        let compressed = compress_bytes(&data, &config).unwrap();
        prop_assert_eq!(decompress_bytes(&compressed, &config).unwrap(), data);
    }

    #[test]
    fn prop_every_rebuild_is_prefix_free(data in proptest::collection::vec(0u8..24, 1..300)) {
        let mut controller = AdaptiveController::new(&AdaptiveConfig::reconstruct(1)).unwrap();
        for byte in data {
            controller.observe(byte as Symbol).unwrap();
            prop_assert!(controller.codes().is_prefix_free());
        }
    }

    #[test]
    fn prop_reconstruct_cadence(interval in 1u64..50, m in 0u64..400) {
        let mut controller = AdaptiveController::new(&AdaptiveConfig::reconstruct(interval)).unwrap();
        for i in 0..m {
            controller.observe((i % 11) as Symbol).unwrap();
        }
        prop_assert_eq!(controller.rebuild_count(), m / interval);
    }

    #[test]
    fn prop_normalization_bound(
        threshold in MIN_NORMALIZE_THRESHOLD..4096,
        data in proptest::collection::vec(any::<u8>(), 0..3000),
    ) {
        let mut controller = AdaptiveController::new(&AdaptiveConfig::normalize(threshold)).unwrap();
        for byte in data {
            controller.observe(byte as Symbol).unwrap();
            prop_assert!(controller.frequencies().total() <= threshold + 1);
        }
    }
}
