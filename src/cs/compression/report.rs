//! Compression run records for the persistence layer.
//!
//! A record carries only aggregate sizes, timing and the algorithm label, never
//! payload internals.

use crate::cs::compression::{Algorithm, Result};
use std::fmt;
use std::time::{Duration, Instant};

/// Outcome of compressing one file with one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionRecord {
    pub file_name: String,
    pub algorithm: Algorithm,
    pub original_size: usize,
    pub compressed_size: usize,
    pub duration: Duration,
}

impl CompressionRecord {
    /// Compressed size divided by original size; 0.0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            self.compressed_size as f64 / self.original_size as f64
        }
    }
}

impl fmt::Display for CompressionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} bytes -> {} bytes ({:.3}) in {:.5} seconds [{}]",
            self.algorithm,
            self.original_size,
            self.compressed_size,
            self.ratio(),
            self.duration.as_secs_f64(),
            self.file_name
        )
    }
}

/// Destination for compression records.
pub trait RecordSink {
    /// Store one record.
    fn record(&mut self, record: &CompressionRecord) -> Result<()>;
}

/// Keeps records in memory, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<CompressionRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CompressionRecord] {
        &self.records
    }
}

impl RecordSink for MemorySink {
    fn record(&mut self, record: &CompressionRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Compress `data` with `algorithm`, timing the call.
///
/// Returns the compressed bytes together with the record describing the run.
pub fn measure(
    algorithm: Algorithm,
    file_name: &str,
    data: &[u8],
) -> Result<(Vec<u8>, CompressionRecord)> {
    let start = Instant::now();
    let compressed = algorithm.codec().compress(data)?;
    let duration = start.elapsed();

    log::debug!(
        "{} compressed {} from {} to {} bytes in {:?}",
        algorithm,
        file_name,
        data.len(),
        compressed.len(),
        duration
    );
    let record = CompressionRecord {
        file_name: file_name.to_string(),
        algorithm,
        original_size: data.len(),
        compressed_size: compressed.len(),
        duration,
    };
    Ok((compressed, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::compression::decompress;

    #[test]
    fn test_measure_reports_sizes() {
        let data = b"AAAABBBCCD".repeat(50);
        let mut sink = MemorySink::new();
        for algorithm in Algorithm::ALL {
            let (compressed, record) = measure(algorithm, "sample.txt", &data).unwrap();
            assert_eq!(record.original_size, data.len());
            assert_eq!(record.compressed_size, compressed.len());
            assert_eq!(record.algorithm, algorithm);
            assert!(record.ratio() < 1.0);
            assert_eq!(decompress(algorithm, &compressed).unwrap(), data);
            sink.record(&record).unwrap();
        }
        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.records()[0].algorithm, Algorithm::Lzw);
        assert_eq!(sink.records()[1].file_name, "sample.txt");
    }

    #[test]
    fn test_empty_ratio() {
        let (compressed, record) = measure(Algorithm::Huffman, "empty", b"").unwrap();
        assert!(compressed.is_empty());
        assert_eq!(record.ratio(), 0.0);
        assert!(record.to_string().starts_with("Huffman: 0 bytes -> 0 bytes"));
    }
}
