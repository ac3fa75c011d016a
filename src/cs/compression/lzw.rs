//! LZW (Lempel-Ziv-Welch) dictionary compression.
//!
//! The dictionary starts with the 256 single-byte strings and grows by one entry
//! per emitted code, up to `2^max_code_bits` entries. Once full it is frozen and
//! encoding continues with the existing entries.
//!
//! # Stream format
//!
//! ```text
//! +---------------+------------+-----------------+------------------------------+
//! | max_code_bits | code_width | code_count (LE) | codes, MSB-first, zero-pad   |
//! |      u8       |     u8     |       u64       | ceil(count * width / 8) bytes|
//! +---------------+------------+-----------------+------------------------------+
//! ```
//!
//! `code_width` is the number of bits needed for the largest code emitted in the
//! stream, so the stream is self-delimiting. Empty input encodes to an empty buffer.

use crate::cs::compression::bits::{bit_width, BitReader, BitWriter, ByteReader};
use crate::cs::compression::{Compression, Result};
use crate::error::Error;
use std::collections::HashMap;

/// Number of pre-seeded single-byte entries.
pub const SEED_CODES: u32 = 256;

/// Smallest accepted dictionary limit in bits.
pub const MIN_CODE_BITS: u8 = 9;

/// Largest accepted dictionary limit in bits.
pub const MAX_CODE_BITS: u8 = 24;

/// Default dictionary limit in bits (65536 entries).
pub const DEFAULT_CODE_BITS: u8 = 16;

const HEADER_LEN: usize = 10;

/// Options controlling the size of the LZW dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwOptions {
    max_code_bits: u8,
}

impl LzwOptions {
    /// Creates options with a dictionary of at most `2^max_code_bits` entries.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` unless `max_code_bits` is in `9..=24`.
    pub fn new(max_code_bits: u8) -> Result<Self> {
        if !(MIN_CODE_BITS..=MAX_CODE_BITS).contains(&max_code_bits) {
            return Err(Error::invalid_input(format!(
                "max_code_bits must be in {}..={}, got {}",
                MIN_CODE_BITS, MAX_CODE_BITS, max_code_bits
            )));
        }
        Ok(LzwOptions { max_code_bits })
    }

    pub fn max_code_bits(&self) -> u8 {
        self.max_code_bits
    }

    /// Maximum number of dictionary entries, seeds included.
    pub fn capacity(&self) -> u32 {
        1 << self.max_code_bits
    }
}

impl Default for LzwOptions {
    fn default() -> Self {
        LzwOptions {
            max_code_bits: DEFAULT_CODE_BITS,
        }
    }
}

/// Encoder-side dictionary keyed by `(prefix code, next byte)`.
///
/// Each entry stands for the string of its prefix code followed by one byte,
/// so no byte strings are stored or copied.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: HashMap<(u32, u8), u32>,
    next_code: u32,
    capacity: u32,
}

impl Dictionary {
    pub fn new(options: LzwOptions) -> Self {
        Dictionary {
            entries: HashMap::new(),
            next_code: SEED_CODES,
            capacity: options.capacity(),
        }
    }

    /// Code for `prefix` extended by `byte`, if present.
    pub fn get(&self, prefix: u32, byte: u8) -> Option<u32> {
        self.entries.get(&(prefix, byte)).copied()
    }

    /// Adds `prefix + byte` under the next free code.
    ///
    /// Returns the assigned code, or `None` once the dictionary is full.
    pub fn insert(&mut self, prefix: u32, byte: u8) -> Option<u32> {
        if self.is_full() {
            return None;
        }
        let code = self.next_code;
        self.entries.insert((prefix, byte), code);
        self.next_code += 1;
        if self.is_full() {
            log::trace!("lzw dictionary saturated at {} entries", self.next_code);
        }
        Some(code)
    }

    /// The code the next insertion will receive.
    pub fn next_code(&self) -> u32 {
        self.next_code
    }

    pub fn is_full(&self) -> bool {
        self.next_code >= self.capacity
    }
}

/// Compresses the input data into a sequence of LZW codes.
///
/// # Parameters
///
/// - `input`: a slice of bytes to compress.
/// - `options`: the dictionary limit.
///
/// # Returns
///
/// The emitted codes. Every code is below the dictionary size at the moment the
/// decoder reads it.
///
/// # Details
///
/// The current match `w` is tracked as a single code. For each byte `c`, if
/// `w + c` is in the dictionary the match is extended; otherwise the code for `w`
/// is emitted, `w + c` is added (while there is room) and the match restarts at `c`.
///
/// # Example
///
/// ```
/// use lzhuff::cs::compression::lzw::{encode_codes, LzwOptions};
///
/// let codes = encode_codes(b"TOBEORNOTTOBE", LzwOptions::default());
/// assert!(codes.len() < 13);
/// ```
pub fn encode_codes(input: &[u8], options: LzwOptions) -> Vec<u32> {
    let mut codes = Vec::new();
    let Some((&first, rest)) = input.split_first() else {
        return codes;
    };

    let mut dict = Dictionary::new(options);
    let mut w = first as u32;
    for &c in rest {
        match dict.get(w, c) {
            Some(code) => w = code,
            None => {
                codes.push(w);
                dict.insert(w, c);
                w = c as u32;
            }
        }
    }
    codes.push(w);

    log::debug!(
        "lzw encoded {} bytes into {} codes ({} dictionary entries)",
        input.len(),
        codes.len(),
        dict.next_code()
    );
    codes
}

/// Decompresses a sequence of LZW codes back into bytes.
///
/// # Parameters
///
/// - `codes`: codes produced by [`encode_codes`] with the same `options`.
/// - `options`: the dictionary limit the encoder used.
///
/// # Returns
///
/// The reconstructed bytes, or `Error::MalformedStream` if a code is neither
/// assigned nor the code about to be assigned.
///
/// # Details
///
/// Every entry at or above 256 is `previous + entry[0]`, which always sits
/// contiguously in the output: the previous string is immediately followed by the
/// current one. Entries are therefore stored as `(offset, len)` spans into the
/// output buffer.
///
/// # Example
///
/// ```
/// use lzhuff::cs::compression::lzw::{decode_codes, encode_codes, LzwOptions};
///
/// let options = LzwOptions::default();
/// let codes = encode_codes(b"TOBEORNOTTOBE", options);
/// assert_eq!(decode_codes(&codes, options).unwrap(), b"TOBEORNOTTOBE");
/// ```
pub fn decode_codes(codes: &[u32], options: LzwOptions) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let Some((&first, rest)) = codes.split_first() else {
        return Ok(output);
    };
    if first >= SEED_CODES {
        return Err(Error::malformed(format!(
            "first code {} is not a single-byte entry",
            first
        )));
    }

    let capacity = options.capacity();
    // spans[i] holds the output span of code 256 + i
    let mut spans: Vec<(usize, usize)> = Vec::new();
    output.push(first as u8);
    let mut prev = (0usize, 1usize);

    for (index, &code) in rest.iter().enumerate() {
        let next_code = SEED_CODES + spans.len() as u32;
        let start = output.len();
        if code < SEED_CODES {
            output.push(code as u8);
        } else if code < next_code {
            let (offset, len) = spans[(code - SEED_CODES) as usize];
            output.extend_from_within(offset..offset + len);
        } else if code == next_code && next_code < capacity {
            // entry = previous + previous[0]
            let (offset, len) = prev;
            output.extend_from_within(offset..offset + len);
            output.push(output[offset]);
        } else {
            return Err(Error::malformed(format!(
                "code {} at index {} exceeds dictionary size {}",
                code,
                index + 1,
                next_code
            )));
        }
        let len = output.len() - start;

        if next_code < capacity {
            spans.push((prev.0, prev.1 + 1));
        }
        prev = (start, len);
    }

    Ok(output)
}

/// Compresses `input` into a self-delimiting LZW stream with default options.
pub fn lzw_encode(input: &[u8]) -> Vec<u8> {
    lzw_encode_with(input, LzwOptions::default())
}

/// Compresses `input` into a self-delimiting LZW stream.
///
/// # Example
///
/// ```
/// use lzhuff::cs::compression::lzw::{lzw_decode, lzw_encode_with, LzwOptions};
///
/// let options = LzwOptions::new(12).unwrap();
/// let stream = lzw_encode_with(b"abababababab", options);
/// assert_eq!(lzw_decode(&stream).unwrap(), b"abababababab");
/// ```
pub fn lzw_encode_with(input: &[u8], options: LzwOptions) -> Vec<u8> {
    let codes = encode_codes(input, options);
    if codes.is_empty() {
        return Vec::new();
    }

    let width = codes.iter().copied().max().map_or(1, bit_width);
    let mut writer = BitWriter::new();
    for &code in &codes {
        writer.write_bits(code, width);
    }
    let (body, bit_len, _) = writer.finish();

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.push(options.max_code_bits());
    out.push(width);
    out.extend_from_slice(&(codes.len() as u64).to_le_bytes());
    out.extend_from_slice(&body);

    log::debug!(
        "lzw stream: {} codes x {} bits = {} bits, {} bytes total",
        codes.len(),
        width,
        bit_len,
        out.len()
    );
    out
}

/// Decompresses a stream produced by [`lzw_encode`] or [`lzw_encode_with`].
///
/// # Errors
///
/// Returns `Error::MalformedStream` for a bad header, a body whose size does not
/// match the header, non-zero padding bits, or an invalid code.
///
/// # Example
///
/// ```
/// use lzhuff::cs::compression::lzw::{lzw_decode, lzw_encode};
///
/// let stream = lzw_encode(b"TOBEORNOTTOBEORTOBEORNOT");
/// assert_eq!(lzw_decode(&stream).unwrap(), b"TOBEORNOTTOBEORTOBEORNOT");
/// assert!(lzw_decode(&stream[..stream.len() - 1]).is_err());
/// ```
pub fn lzw_decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ByteReader::new(data);
    let max_code_bits = reader.read_u8("max code bits")?;
    let options = LzwOptions::new(max_code_bits)
        .map_err(|_| Error::malformed(format!("invalid max code bits {}", max_code_bits)))?;
    let width = reader.read_u8("code width")?;
    if width == 0 || width > max_code_bits {
        return Err(Error::malformed(format!(
            "code width {} outside 1..={}",
            width, max_code_bits
        )));
    }
    let count = reader.read_u64_le("code count")?;
    if count == 0 {
        return Err(Error::malformed("non-empty stream declares zero codes"));
    }

    let body_bits = count
        .checked_mul(width as u64)
        .ok_or_else(|| Error::malformed(format!("code count {} overflows", count)))?;
    let expected = body_bits.div_ceil(8);
    let body = reader.read_rest();
    if body.len() as u64 != expected {
        return Err(Error::malformed(format!(
            "expected {} code bytes for {} codes of {} bits, found {}",
            expected,
            count,
            width,
            body.len()
        )));
    }

    let mut bits = BitReader::new(body);
    let mut codes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let code = bits
            .read_bits(width)
            .ok_or_else(|| Error::malformed("code body ended early"))?;
        codes.push(code);
    }
    if !bits.rest_is_zero() {
        return Err(Error::malformed("non-zero padding after last code"));
    }

    decode_codes(&codes, options)
}

/// LZW codec over the framed stream format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzw {
    options: LzwOptions,
}

impl Lzw {
    /// Codec with a 16-bit dictionary limit.
    pub const DEFAULT: Lzw = Lzw {
        options: LzwOptions {
            max_code_bits: DEFAULT_CODE_BITS,
        },
    };

    pub fn new(options: LzwOptions) -> Self {
        Lzw { options }
    }
}

impl Compression for Lzw {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(lzw_encode_with(data, self.options))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lzw_decode(data)
    }
}
