//! Compression algorithms implementation.
//!
//! This module provides two lossless byte codecs:
//! - LZW, an adaptive dictionary coder with fixed-width framed codes
//! - Huffman, a static entropy coder carrying its codeword table as side information
//!
//! Both operate on whole in-memory buffers. Each call owns its own dictionary or
//! tree, so independent calls never share state.
//!
//! # Examples
//!
//! ```rust
//! use lzhuff::cs::compression::{compress, decompress, Algorithm};
//!
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! for algorithm in Algorithm::ALL {
//!     let packed = compress(algorithm, data).unwrap();
//!     assert_eq!(decompress(algorithm, &packed).unwrap(), data);
//! }
//! ```

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub mod bits;
pub mod huffman;
pub mod lzw;
pub mod report;

pub use huffman::{
    build_frequency_table, huffman_decode, huffman_encode, CodeTable, Huffman, HuffmanEncoded,
    HuffmanNode, HuffmanTree,
};
pub use lzw::{decode_codes, encode_codes, lzw_decode, lzw_encode, lzw_encode_with, Lzw, LzwOptions};
pub use report::{measure, CompressionRecord, MemorySink, RecordSink};

/// Selects one of the codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Lzw,
    Huffman,
}

impl Algorithm {
    /// Every available algorithm.
    pub const ALL: [Algorithm; 2] = [Algorithm::Lzw, Algorithm::Huffman];

    /// Label handed to the persistence layer.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Lzw => "LZW",
            Algorithm::Huffman => "Huffman",
        }
    }

    /// The codec for this algorithm with default options.
    pub fn codec(&self) -> &'static dyn Compression {
        static LZW: Lzw = Lzw::DEFAULT;
        match self {
            Algorithm::Lzw => &LZW,
            Algorithm::Huffman => &Huffman,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lzw" => Ok(Algorithm::Lzw),
            "huffman" => Ok(Algorithm::Huffman),
            other => Err(Error::invalid_input(format!(
                "unknown algorithm '{}', expected 'lzw' or 'huffman'",
                other
            ))),
        }
    }
}

/// Compress `data` with the selected algorithm.
pub fn compress(algorithm: Algorithm, data: &[u8]) -> Result<Vec<u8>> {
    algorithm.codec().compress(data)
}

/// Decompress `data` that was compressed with the selected algorithm.
pub fn decompress(algorithm: Algorithm, data: &[u8]) -> Result<Vec<u8>> {
    algorithm.codec().decompress(data)
}
