//! Lossless LZW and Huffman byte codecs.
//!
//! The four core operations are [`lzw_encode`], [`lzw_decode`], [`huffman_encode`]
//! and [`huffman_decode`]. Everything runs on whole in-memory buffers.

pub mod cs;
pub mod error;

pub use cs::compression;
pub use cs::compression::{
    huffman_decode, huffman_encode, lzw_decode, lzw_encode, Algorithm, Compression,
};
pub use error::{Error, Result};
