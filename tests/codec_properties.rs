use lzhuff::cs::compression::huffman::{build_frequency_table, HuffmanTree};
use lzhuff::cs::compression::lzw::{encode_codes, lzw_encode_with, Dictionary, LzwOptions};
use lzhuff::{huffman_decode, huffman_encode, lzw_decode, lzw_encode, Algorithm, Compression};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_inputs(seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut inputs = Vec::new();
    for _ in 0..40 {
        let len = rng.gen_range(0..3000);
        // alphabet sizes from a single symbol to all 256 values
        let alphabet: u16 = rng.gen_range(1..=256);
        let skewed = rng.gen_bool(0.5);
        let input = (0..len)
            .map(|_| {
                let mut v = rng.gen_range(0..alphabet);
                if skewed {
                    v = v.min(rng.gen_range(0..alphabet));
                }
                v as u8
            })
            .collect();
        inputs.push(input);
    }
    inputs
}

fn all_byte_values() -> Vec<u8> {
    let mut input: Vec<u8> = (0..=255u8).collect();
    input.extend((0..=255u8).rev());
    input.extend((0..=255u8).step_by(3));
    input
}

/// Total cost of an optimal prefix code: the sum of all merged weights.
fn optimal_cost(freq: &[u64; 256]) -> u64 {
    let mut weights: Vec<u64> = freq.iter().copied().filter(|&f| f > 0).collect();
    if weights.len() == 1 {
        return weights[0];
    }
    let mut cost = 0;
    while weights.len() > 1 {
        weights.sort_unstable_by(|a, b| b.cmp(a));
        let a = weights.pop().unwrap();
        let b = weights.pop().unwrap();
        cost += a + b;
        weights.push(a + b);
    }
    cost
}

#[test]
fn test_lzw_random_roundtrip() {
    for input in random_inputs(7) {
        let stream = lzw_encode(&input);
        assert_eq!(lzw_decode(&stream).unwrap(), input);
    }
}

#[test]
fn test_lzw_small_dictionary_roundtrip() {
    let options = LzwOptions::new(9).unwrap();
    for input in random_inputs(11) {
        let stream = lzw_encode_with(&input, options);
        assert_eq!(lzw_decode(&stream).unwrap(), input);
    }
}

#[test]
fn test_huffman_random_roundtrip() {
    for input in random_inputs(13) {
        let encoded = huffman_encode(&input);
        assert_eq!(huffman_decode(&encoded).unwrap(), input);
    }
}

#[test]
fn test_all_byte_values_roundtrip() {
    let input = all_byte_values();
    assert_eq!(lzw_decode(&lzw_encode(&input)).unwrap(), input);
    let encoded = huffman_encode(&input);
    assert_eq!(encoded.table.len(), 256);
    assert_eq!(huffman_decode(&encoded).unwrap(), input);
}

#[test]
fn test_codecs_roundtrip_through_trait() {
    for input in random_inputs(17).into_iter().take(10) {
        for algorithm in Algorithm::ALL {
            let codec = algorithm.codec();
            let packed = codec.compress(&input).unwrap();
            assert_eq!(codec.decompress(&packed).unwrap(), input, "{}", algorithm);
        }
    }
}

#[test]
fn test_codewords_are_prefix_free() {
    for input in random_inputs(19) {
        let encoded = huffman_encode(&input);
        let codes: Vec<_> = encoded.table.iter().collect();
        for (i, (_, a)) in codes.iter().enumerate() {
            for (j, (_, b)) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "codeword {} prefixes codeword {}", i, j);
                }
            }
        }
        assert!(encoded.table.is_prefix_free());
    }
}

#[test]
fn test_huffman_total_bits_are_optimal() {
    for input in random_inputs(23) {
        let encoded = huffman_encode(&input);
        let freq = build_frequency_table(&input);
        let expected = if input.is_empty() { 0 } else { optimal_cost(&freq) };
        assert_eq!(encoded.bit_len, expected);
        assert!(encoded.bit_len <= input.len() as u64 * 8);

        let weighted: u64 = encoded
            .table
            .lengths()
            .iter()
            .map(|(&s, &len)| freq[s as usize] * len as u64)
            .sum();
        assert_eq!(weighted, encoded.bit_len);
    }
}

#[test]
fn test_length_distribution_is_stable() {
    for input in random_inputs(29) {
        let first = HuffmanTree::from_data(&input).map(|t| t.code_table().lengths());
        let second = HuffmanTree::from_data(&input).map(|t| t.code_table().lengths());
        assert_eq!(first, second);
    }
}

#[test]
fn test_dictionary_growth_is_monotonic() {
    for input in random_inputs(31) {
        let Some((&first, rest)) = input.split_first() else {
            continue;
        };
        let mut dict = Dictionary::new(LzwOptions::default());
        let mut introduced = Vec::new();
        let mut w = first as u32;
        for &c in rest {
            match dict.get(w, c) {
                Some(code) => w = code,
                None => {
                    introduced.extend(dict.insert(w, c));
                    w = c as u32;
                }
            }
        }
        assert!(introduced.iter().all(|&code| code >= 256));
        assert!(introduced.windows(2).all(|pair| pair[0] < pair[1]));

        // each emitted code was assigned (or is about to be) when the decoder reads it
        let codes = encode_codes(&input, LzwOptions::default());
        for (i, &code) in codes.iter().enumerate() {
            assert!(code < 256 + i as u32, "code {} at index {}", code, i);
        }
        assert_eq!(codes.len(), introduced.len() + 1);
    }
}

#[test]
fn test_repeated_byte_scenario() {
    let input = vec![0x42u8; 1000];
    let stream = lzw_encode(&input);
    assert!(stream.len() * 10 < input.len());
    assert_eq!(lzw_decode(&stream).unwrap(), input);

    let encoded = huffman_encode(&input);
    assert_eq!(encoded.table.len(), 1);
    assert_eq!(huffman_decode(&encoded).unwrap(), input);
}

#[test]
fn test_corrupted_lzw_streams_never_panic() {
    let mut rng = StdRng::seed_from_u64(37);
    let input = b"TOBEORNOTTOBEORTOBEORNOT and then some more text to encode".repeat(4);
    let stream = lzw_encode(&input);
    for _ in 0..200 {
        let mut corrupt = stream.clone();
        let idx = rng.gen_range(2..corrupt.len());
        corrupt[idx] ^= 1 << rng.gen_range(0..8);
        if let Ok(out) = lzw_decode(&corrupt) {
            assert!(!out.is_empty());
        }
    }
}

#[test]
fn test_corrupted_huffman_streams_never_panic() {
    let mut rng = StdRng::seed_from_u64(41);
    let input = b"huffman coding in rust is fun!".repeat(3);
    let packed = Algorithm::Huffman.codec().compress(&input).unwrap();
    for _ in 0..200 {
        let mut corrupt = packed.clone();
        let idx = rng.gen_range(0..corrupt.len());
        corrupt[idx] ^= 1 << rng.gen_range(0..8);
        let _ = Algorithm::Huffman.codec().decompress(&corrupt);
    }
}
