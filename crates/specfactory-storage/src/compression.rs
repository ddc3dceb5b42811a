// SPDX-License-Identifier: MIT OR Apache-2.0
//! At-rest compression for blob values.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compression codec applied to a blob value before it is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// Stored as-is.
    #[default]
    None,
    /// Gzip, default compression level.
    Gzip,
}

/// Compress `data` under `codec`.
pub fn compress(codec: Codec, data: &[u8]) -> std::io::Result<Vec<u8>> {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
    }
}

/// Decompress `data` previously produced by [`compress`] under `codec`.
pub fn decompress(codec: Codec, data: &[u8]) -> std::io::Result<Vec<u8>> {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Gzip => {
            let mut decoder = GzDecoder::new(data);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            Ok(out)
        }
    }
}

/// Cumulative compression statistics for one [`crate::FileBlobStorage`].
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    /// Total bytes before compression, summed across every `put`.
    pub total_original: u64,
    /// Total bytes after compression, summed across every `put`.
    pub total_stored: u64,
}

impl CompressionStats {
    /// Record one write.
    pub fn record(&mut self, original: usize, stored: usize) {
        self.total_original += original as u64;
        self.total_stored += stored as u64;
    }

    /// Overall `stored / original` ratio, `0.0` if nothing has been written.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total_original == 0 {
            return 0.0;
        }
        self.total_stored as f64 / self.total_original as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_codec_round_trips_unchanged() {
        let data = b"hello world";
        let compressed = compress(Codec::None, data).unwrap();
        assert_eq!(compressed, data);
        assert_eq!(decompress(Codec::None, &compressed).unwrap(), data);
    }

    #[test]
    fn gzip_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress(Codec::Gzip, &data).unwrap();
        assert_eq!(decompress(Codec::Gzip, &compressed).unwrap(), data);
    }

    #[test]
    fn gzip_shrinks_repetitive_data() {
        let data = vec![b'a'; 10_000];
        let compressed = compress(Codec::Gzip, &data).unwrap();
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn stats_track_cumulative_bytes() {
        let mut stats = CompressionStats::default();
        stats.record(100, 40);
        stats.record(50, 20);
        assert_eq!(stats.total_original, 150);
        assert_eq!(stats.total_stored, 60);
        assert!((stats.ratio() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_has_zero_ratio() {
        assert_eq!(CompressionStats::default().ratio(), 0.0);
    }
}
