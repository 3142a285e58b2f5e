//! Statistics collection and reporting for one compress or decompress run.
//!
//! Tracks what the caller usually wants to see after a run:
//! - Bytes in/out and the compression ratio
//! - Symbols coded
//! - Tree rebuilds and frequency normalizations (adaptive runs)
//! - Timing
//!
//! # Thread Safety
//!
//! `CodecStats` is a plain value filled in by the stream entry points; it is
//! not shared while a run is in progress.

use std::time::{Duration, Instant};

/// Counters for one run.
#[derive(Debug, Clone)]
pub struct CodecStats {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Input/Output ===
    /// Bytes read from the source
    pub input_bytes: u64,

    /// Bytes written to the sink
    pub output_bytes: u64,

    /// Symbols encoded or decoded, end marker excluded
    pub symbols: u64,

    // === Model ===
    /// Tree rebuilds after the initial build
    pub rebuilds: u64,

    /// Frequency table normalizations
    pub normalizations: u64,
}

impl CodecStats {
    /// Create new stats with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            symbols: 0,
            rebuilds: 0,
            normalizations: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compressed size over original size.
    ///
    /// For a compress run that is output / input, for a decompress run
    /// input / output. Returns 0.0 if the original is empty.
    pub fn compression_ratio(&self, decompressing: bool) -> f64 {
        let (compressed, raw) = if decompressing {
            (self.input_bytes, self.output_bytes)
        } else {
            (self.output_bytes, self.input_bytes)
        };
        if raw == 0 {
            0.0
        } else {
            compressed as f64 / raw as f64
        }
    }

    /// Average code length in bits per coded symbol (compressed side).
    pub fn bits_per_symbol(&self, decompressing: bool) -> f64 {
        let compressed = if decompressing {
            self.input_bytes
        } else {
            self.output_bytes
        };
        if self.symbols == 0 {
            0.0
        } else {
            compressed as f64 * 8.0 / self.symbols as f64
        }
    }

    /// Compute throughput in bytes/second over the input.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self, decompressing: bool) {
        let direction = if decompressing { "Decompression" } else { "Compression" };

        println!("\n=== {direction} Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Input:  {} bytes", self.input_bytes);
        println!("Output: {} bytes", self.output_bytes);
        println!("Symbols: {}", self.symbols);
        println!("Ratio: {:.1}%", self.compression_ratio(decompressing) * 100.0);
        println!("Bits/symbol: {:.3}", self.bits_per_symbol(decompressing));
        println!();
        println!("=== Model ===");
        println!("Rebuilds: {}", self.rebuilds);
        println!("Normalizations: {}", self.normalizations);
        println!();
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Export stats as a simple key=value text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             symbols={}\n\
             rebuilds={}\n\
             normalizations={}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.symbols,
            self.rebuilds,
            self.normalizations,
        )
    }
}

impl Default for CodecStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_creation() {
        let stats = CodecStats::new();
        assert!(stats.end_time.is_none());
        assert!(stats.duration().as_millis() < 100);
    }

    #[test]
    fn test_compression_ratio() {
        let mut stats = CodecStats::new();
        stats.input_bytes = 1000;
        stats.output_bytes = 750;
        assert_eq!(stats.compression_ratio(false), 0.75);

        stats.input_bytes = 250;
        stats.output_bytes = 1000;
        assert_eq!(stats.compression_ratio(true), 0.25);

        assert_eq!(CodecStats::new().compression_ratio(false), 0.0);
    }

    #[test]
    fn test_bits_per_symbol() {
        let mut stats = CodecStats::new();
        stats.symbols = 16;
        stats.output_bytes = 4;
        assert_eq!(stats.bits_per_symbol(false), 2.0);
    }

    #[test]
    fn test_throughput() {
        let mut stats = CodecStats::new();
        stats.input_bytes = 1_000_000;

        std::thread::sleep(Duration::from_millis(10));
        stats.complete();

        assert!(stats.throughput_bps() > 0.0);
    }

    #[test]
    fn test_export_text() {
        let mut stats = CodecStats::new();
        stats.input_bytes = 1000;
        stats.output_bytes = 600;
        stats.rebuilds = 3;

        let text = stats.export_text();
        assert!(text.contains("input_bytes=1000"));
        assert!(text.contains("output_bytes=600"));
        assert!(text.contains("rebuilds=3"));
    }
}
