//! Bit and byte framing utilities shared by the LZW and Huffman engines.
//!
//! Bits are always packed most-significant-bit first. The final byte of a
//! packed bit string is padded with zero bits.

use crate::cs::compression::Result;
use crate::error::Error;
use bitvec::prelude::*;
use bitvec::view::BitView;

/// Number of bits needed to represent `value` (at least 1).
pub fn bit_width(value: u32) -> u8 {
    (u32::BITS - value.leading_zeros()).max(1) as u8
}

/// Number of padding bits needed to fill the last byte of a `bit_len`-bit string.
pub fn padding_for(bit_len: usize) -> u8 {
    ((8 - bit_len % 8) % 8) as u8
}

/// Accumulates bits MSB-first.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bits: BitVec<u8, Msb0>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Write the low `width` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, width: u8) {
        debug_assert!(width as u32 <= u32::BITS);
        for shift in (0..width as u32).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    /// Append an already-built bit string.
    pub fn write_slice(&mut self, bits: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(bits);
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Pad to a byte boundary with zeros and return `(bytes, bit_len, padding)`.
    pub fn finish(mut self) -> (Vec<u8>, usize, u8) {
        let bit_len = self.bits.len();
        let padding = padding_for(bit_len);
        self.bits.resize(bit_len + padding as usize, false);
        (self.bits.into_vec(), bit_len, padding)
    }
}

/// Reads bits MSB-first from a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            bits: data.view_bits::<Msb0>(),
            pos: 0,
        }
    }

    /// Read one bit, or `None` at the end of the data.
    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.pos).map(|b| *b)?;
        self.pos += 1;
        Some(bit)
    }

    /// Read `width` bits as an unsigned value, or `None` if fewer remain.
    pub fn read_bits(&mut self, width: u8) -> Option<u32> {
        let end = self.pos.checked_add(width as usize)?;
        let field = self.bits.get(self.pos..end)?;
        self.pos = end;
        Some(field.iter().fold(0u32, |acc, bit| (acc << 1) | *bit as u32))
    }

    /// Bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Whether every unread bit is zero.
    pub fn rest_is_zero(&self) -> bool {
        self.bits[self.pos..].not_any()
    }
}

/// Bounds-checked little-endian reader over a byte slice.
///
/// Running out of bytes is reported as a malformed stream naming the field
/// that was being read.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::malformed(format!(
                "truncated {} at offset {}: need {} bytes, {} left",
                field,
                self.pos,
                len,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Take every byte that has not been read yet.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.read_bytes(1, field)?[0])
    }

    pub fn read_u16_le(&mut self, field: &str) -> Result<u16> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.read_bytes(2, field)?);
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u64_le(&mut self, field: &str) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_bytes(8, field)?);
        Ok(u64::from_le_bytes(buf))
    }
}
