//! Static Huffman coding over bytes.
//!
//! The tree is built once from the full input's byte frequencies and stored as
//! an arena of nodes addressed by index. Decoding never sees the tree: the
//! codeword table travels with the payload as side information and the decoder
//! rebuilds a lookup trie from it.
//!
//! # Serialized form
//!
//! ```text
//! symbol count        u16 LE
//! per symbol          value u8, bit length u8, codeword bits (ceil(len / 8) bytes, MSB-first)
//! payload bit length  u64 LE
//! padding             u8 (0..=7)
//! payload             remaining bytes
//! ```
//!
//! Empty input serializes to an empty buffer.

use crate::cs::compression::bits::{padding_for, BitReader, BitWriter, ByteReader};
use crate::cs::compression::{Compression, Result};
use crate::error::Error;
use bitvec::prelude::*;
use bitvec::view::BitView;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// A node in the Huffman tree arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf holds one symbol and its frequency.
    Leaf { symbol: u8, freq: u64 },
    /// An internal node holds the indices of its two children and their combined frequency.
    Internal { freq: u64, left: usize, right: usize },
}

impl HuffmanNode {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// Count how often each byte value occurs in `input`.
pub fn build_frequency_table(input: &[u8]) -> [u64; 256] {
    let mut freq = [0u64; 256];
    for &b in input {
        freq[b as usize] += 1;
    }
    freq
}

/// A Huffman tree stored as a node arena with a root index.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: usize,
}

impl HuffmanTree {
    /// Build the tree for a frequency table.
    ///
    /// Returns `None` if every frequency is zero.
    ///
    /// Leaves enter the min-heap in ascending symbol order and every node carries
    /// its insertion sequence number, so equal frequencies resolve first-inserted-first.
    pub fn from_frequencies(freq: &[u64; 256]) -> Option<Self> {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();
        for (symbol, &f) in freq.iter().enumerate() {
            if f > 0 {
                let idx = nodes.len();
                nodes.push(HuffmanNode::Leaf {
                    symbol: symbol as u8,
                    freq: f,
                });
                heap.push(Reverse((f, idx)));
            }
        }

        // Combine nodes until only one tree remains.
        while heap.len() > 1 {
            let (Some(Reverse((lf, left))), Some(Reverse((rf, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let idx = nodes.len();
            nodes.push(HuffmanNode::Internal {
                freq: lf + rf,
                left,
                right,
            });
            heap.push(Reverse((lf + rf, idx)));
        }

        let Reverse((_, root)) = heap.pop()?;
        Some(HuffmanTree { nodes, root })
    }

    /// Build the tree for the bytes of `input`. Returns `None` for empty input.
    pub fn from_data(input: &[u8]) -> Option<Self> {
        Self::from_frequencies(&build_frequency_table(input))
    }

    pub fn root(&self) -> &HuffmanNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, index: usize) -> Option<&HuffmanNode> {
        self.nodes.get(index)
    }

    /// Number of distinct symbols (leaves).
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, HuffmanNode::Leaf { .. }))
            .count()
    }

    /// Derive the codeword table by walking root-to-leaf paths (left = 0, right = 1).
    ///
    /// The walk uses an explicit stack, so skewed trees cannot exhaust the call stack.
    /// A tree consisting of a single leaf assigns that symbol the codeword `0`.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let mut stack: Vec<(usize, BitVec<u8, Msb0>)> = vec![(self.root, BitVec::new())];
        while let Some((idx, prefix)) = stack.pop() {
            match &self.nodes[idx] {
                HuffmanNode::Leaf { symbol, .. } => {
                    let code = if prefix.is_empty() {
                        bitvec![u8, Msb0; 0]
                    } else {
                        prefix
                    };
                    table.codes.insert(*symbol, code);
                }
                HuffmanNode::Internal { left, right, .. } => {
                    let mut right_prefix = prefix.clone();
                    right_prefix.push(true);
                    stack.push((*right, right_prefix));
                    let mut left_prefix = prefix;
                    left_prefix.push(false);
                    stack.push((*left, left_prefix));
                }
            }
        }
        table
    }
}

/// Mapping from symbol to codeword, ordered by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitVec<u8, Msb0>>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from explicit codewords, rejecting anything that is not a
    /// usable prefix-free code.
    ///
    /// # Errors
    ///
    /// `Error::MalformedStream` on an empty codeword, a codeword longer than 255
    /// bits, a repeated symbol, or one codeword being a prefix of another.
    pub fn from_codewords<I>(codewords: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, BitVec<u8, Msb0>)>,
    {
        let mut table = CodeTable::new();
        for (symbol, code) in codewords {
            if code.is_empty() || code.len() > u8::MAX as usize {
                return Err(Error::malformed(format!(
                    "codeword for symbol {} has invalid length {}",
                    symbol,
                    code.len()
                )));
            }
            if table.codes.insert(symbol, code).is_some() {
                return Err(Error::malformed(format!(
                    "symbol {} appears twice in code table",
                    symbol
                )));
            }
        }
        DecodeTrie::build(&table)?;
        Ok(table)
    }

    /// Codeword for `symbol`.
    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&symbol).map(|c| c.as_bitslice())
    }

    /// Iterate `(symbol, codeword)` in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> {
        self.codes.iter().map(|(&s, c)| (s, c.as_bitslice()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codeword length per symbol.
    pub fn lengths(&self) -> BTreeMap<u8, usize> {
        self.codes.iter().map(|(&s, c)| (s, c.len())).collect()
    }

    /// Whether no codeword is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        DecodeTrie::build(self).is_ok()
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.codes.len() as u16).to_le_bytes());
        for (&symbol, code) in &self.codes {
            out.push(symbol);
            out.push(code.len() as u8);
            let mut bits = code.clone();
            bits.resize(code.len() + padding_for(code.len()) as usize, false);
            out.extend_from_slice(&bits.into_vec());
        }
    }

    fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
        let count = reader.read_u16_le("symbol count")?;
        if count > 256 {
            return Err(Error::malformed(format!(
                "symbol count {} exceeds 256",
                count
            )));
        }
        let mut codewords = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let symbol = reader.read_u8("symbol")?;
            let len = reader.read_u8("codeword length")? as usize;
            let bytes = reader.read_bytes(len.div_ceil(8), "codeword bits")?;
            let code = bytes.view_bits::<Msb0>()[..len].to_bitvec();
            codewords.push((symbol, code));
        }
        Self::from_codewords(codewords)
    }
}

/// Binary trie mapping codeword paths back to symbols.
struct DecodeTrie {
    // children[i] = (left, right); 0 marks a missing child since the root is never a child
    children: Vec<(usize, usize)>,
    symbols: Vec<Option<u8>>,
}

impl DecodeTrie {
    fn build(table: &CodeTable) -> Result<Self> {
        let mut trie = DecodeTrie {
            children: vec![(0, 0)],
            symbols: vec![None],
        };
        for (symbol, code) in table.iter() {
            let mut node = 0;
            for bit in code.iter().by_vals() {
                if trie.symbols[node].is_some() {
                    return Err(Self::conflict(symbol));
                }
                let child = if bit {
                    trie.children[node].1
                } else {
                    trie.children[node].0
                };
                node = if child != 0 {
                    child
                } else {
                    let idx = trie.children.len();
                    trie.children.push((0, 0));
                    trie.symbols.push(None);
                    if bit {
                        trie.children[node].1 = idx;
                    } else {
                        trie.children[node].0 = idx;
                    }
                    idx
                };
            }
            if trie.symbols[node].is_some() || trie.children[node] != (0, 0) {
                return Err(Self::conflict(symbol));
            }
            trie.symbols[node] = Some(symbol);
        }
        Ok(trie)
    }

    fn conflict(symbol: u8) -> Error {
        Error::malformed(format!(
            "codeword for symbol {} conflicts with a prefix of another codeword",
            symbol
        ))
    }

    fn step(&self, node: usize, bit: bool) -> Option<usize> {
        let (left, right) = self.children[node];
        let child = if bit { right } else { left };
        (child != 0).then_some(child)
    }
}

/// Encode `input` with `table`.
///
/// Returns `(payload, bit_len, padding)`: the packed bytes, the number of
/// meaningful bits and the number of zero bits padding the last byte.
///
/// # Errors
///
/// `Error::InvalidInput` if a byte of `input` has no codeword in `table`.
pub fn encode(input: &[u8], table: &CodeTable) -> Result<(Vec<u8>, u64, u8)> {
    let mut writer = BitWriter::new();
    for &b in input {
        let code = table
            .get(b)
            .ok_or_else(|| Error::invalid_input(format!("no codeword for symbol {}", b)))?;
        writer.write_slice(code);
    }
    let (payload, bit_len, padding) = writer.finish();
    Ok((payload, bit_len as u64, padding))
}

/// Decode the first `bit_len` bits of `payload` with `table`.
///
/// # Errors
///
/// `Error::MalformedStream` if the table is not prefix-free, the payload is
/// shorter than `bit_len`, a bit path matches no codeword, or the final bits
/// stop part-way through a codeword.
pub fn decode(payload: &[u8], bit_len: u64, table: &CodeTable) -> Result<Vec<u8>> {
    if bit_len > payload.len() as u64 * 8 {
        return Err(Error::malformed(format!(
            "declared {} payload bits but only {} bytes present",
            bit_len,
            payload.len()
        )));
    }
    if bit_len > 0 && table.is_empty() {
        return Err(Error::malformed("payload present but code table is empty"));
    }

    let trie = DecodeTrie::build(table)?;
    let mut reader = BitReader::new(payload);
    let mut output = Vec::new();
    let mut node = 0;
    for pos in 0..bit_len {
        let bit = reader
            .read_bit()
            .ok_or_else(|| Error::malformed("payload ended early"))?;
        node = trie.step(node, bit).ok_or_else(|| {
            Error::malformed(format!("bit {} does not continue any codeword", pos))
        })?;
        if let Some(symbol) = trie.symbols[node] {
            output.push(symbol);
            node = 0;
        }
    }
    if node != 0 {
        return Err(Error::malformed(
            "trailing bits do not form a complete codeword",
        ));
    }
    Ok(output)
}

/// Output of [`huffman_encode`]: packed payload plus the side information needed to decode it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanEncoded {
    pub table: CodeTable,
    pub payload: Vec<u8>,
    pub bit_len: u64,
    pub padding: u8,
}

impl HuffmanEncoded {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty() && self.payload.is_empty()
    }

    /// Serialize table and payload into one self-contained buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.table.write_to(&mut out);
        out.extend_from_slice(&self.bit_len.to_le_bytes());
        out.push(self.padding);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parse a buffer produced by [`HuffmanEncoded::to_bytes`].
    ///
    /// # Errors
    ///
    /// `Error::MalformedStream` on truncation, an invalid table, `padding > 7`, or a
    /// bit length that disagrees with the payload size and padding.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(HuffmanEncoded::default());
        }
        let mut reader = ByteReader::new(data);
        let table = CodeTable::read_from(&mut reader)?;
        let bit_len = reader.read_u64_le("payload bit length")?;
        let padding = reader.read_u8("padding")?;
        if padding > 7 {
            return Err(Error::malformed(format!("padding {} exceeds 7", padding)));
        }
        let payload = reader.read_rest().to_vec();
        let total_bits = payload.len() as u64 * 8;
        if total_bits.checked_sub(padding as u64) != Some(bit_len) {
            return Err(Error::malformed(format!(
                "bit length {} does not match {} payload bytes with {} padding bits",
                bit_len,
                payload.len(),
                padding
            )));
        }
        Ok(HuffmanEncoded {
            table,
            payload,
            bit_len,
            padding,
        })
    }
}

/// Build the Huffman code for `input` and encode it.
///
/// Empty input yields an empty payload and an empty table.
///
/// # Example
///
/// ```
/// use lzhuff::cs::compression::huffman::{huffman_decode, huffman_encode};
///
/// let encoded = huffman_encode(b"AAAABBBCCD");
/// assert_eq!(encoded.bit_len, 19);
/// assert_eq!(huffman_decode(&encoded).unwrap(), b"AAAABBBCCD");
/// ```
pub fn huffman_encode(input: &[u8]) -> HuffmanEncoded {
    let Some(tree) = HuffmanTree::from_data(input) else {
        return HuffmanEncoded::default();
    };
    let table = tree.code_table();
    let mut writer = BitWriter::new();
    for &b in input {
        if let Some(code) = table.get(b) {
            writer.write_slice(code);
        }
    }
    let (payload, bit_len, padding) = writer.finish();

    log::debug!(
        "huffman encoded {} bytes over {} symbols into {} bits",
        input.len(),
        table.len(),
        bit_len
    );
    HuffmanEncoded {
        table,
        payload,
        bit_len: bit_len as u64,
        padding,
    }
}

/// Decode the output of [`huffman_encode`].
///
/// # Errors
///
/// `Error::MalformedStream` if padding and bit length disagree with the payload,
/// or the payload cannot be decoded with the table.
pub fn huffman_decode(encoded: &HuffmanEncoded) -> Result<Vec<u8>> {
    if encoded.padding > 7 {
        return Err(Error::malformed(format!(
            "padding {} exceeds 7",
            encoded.padding
        )));
    }
    let total_bits = encoded.payload.len() as u64 * 8;
    if total_bits.checked_sub(encoded.padding as u64) != Some(encoded.bit_len) {
        return Err(Error::malformed(format!(
            "bit length {} does not match {} payload bytes with {} padding bits",
            encoded.bit_len,
            encoded.payload.len(),
            encoded.padding
        )));
    }
    decode(&encoded.payload, encoded.bit_len, &encoded.table)
}

/// Huffman codec over the serialized form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Huffman;

impl Compression for Huffman {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(huffman_encode(data).to_bytes())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        huffman_decode(&HuffmanEncoded::from_bytes(data)?)
    }
}
