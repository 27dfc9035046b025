use anyhow::{anyhow, bail};
use assetzip_core::{Codec, CodecMode};

/// FastLZ (level 1) codec, byte-compatible with Solady's `LibZip.flzCompress`
/// and decodable on-chain by `LibZip.flzDecompress`.
///
/// # Stream format
/// ```text
/// 000lllll  <l+1 literal bytes>              literal run, 1..=32 bytes
/// LLLddddd  dddddddd                         match, len = L+2 (L in 1..=6)
/// 111ddddd  llllllll  dddddddd               match, len = l+9
/// ```
/// `d` is the back-reference distance minus one (13 bits, < 8192).
///
/// Worst case output is `n + n/32 + 1` bytes: each 32-byte literal run costs
/// one control byte and matches never grow.
pub struct FastLzCodec;

const HASH_SIZE: usize = 1 << 13;
const MAX_DISTANCE: usize = 8192;
const MAX_LITERAL_RUN: usize = 32;
/// Longest match a single 3-byte token can describe (253 + 9).
const MAX_MATCH_CHUNK: usize = 262;
/// Never matches a 24-bit sequence.
const NO_MATCH: u32 = 0x100_0000;

impl Codec for FastLzCodec {
    fn mode(&self) -> CodecMode {
        CodecMode::Flz
    }

    fn name(&self) -> &'static str {
        "flz"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(flz_compress(raw))
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        flz_decompress(compressed)
    }

    fn max_compressed_len(&self, raw_len: usize) -> Option<usize> {
        Some(raw_len + raw_len / MAX_LITERAL_RUN + 1)
    }
}

#[inline]
fn read_u24(buf: &[u8], i: usize) -> u32 {
    buf[i] as u32 | (buf[i + 1] as u32) << 8 | (buf[i + 2] as u32) << 16
}

#[inline]
fn hash(seq: u32) -> usize {
    ((2_654_435_769u64 * seq as u64) >> 19) as usize & (HASH_SIZE - 1)
}

fn push_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for run in literals.chunks(MAX_LITERAL_RUN) {
        out.push((run.len() - 1) as u8);
        out.extend_from_slice(run);
    }
}

pub fn flz_compress(input: &[u8]) -> Vec<u8> {
    let n = input.len();
    let mut out = Vec::with_capacity(n + n / MAX_LITERAL_RUN + 1);
    // Matching stops 13 bytes short of the end so every u24 read and the
    // match extension stay in bounds; the tail is emitted as literals.
    let limit = n.saturating_sub(13);
    let mut table = vec![0usize; HASH_SIZE];
    let mut anchor = 0;
    let mut i = 2;

    while i < limit {
        let mut reference;
        let mut distance;
        loop {
            let seq = read_u24(input, i);
            let slot = hash(seq);
            reference = table[slot];
            table[slot] = i;
            distance = i - reference;
            let candidate = if distance < MAX_DISTANCE {
                read_u24(input, reference)
            } else {
                NO_MATCH
            };
            if i >= limit {
                break;
            }
            i += 1;
            if seq == candidate {
                break;
            }
        }
        if i >= limit {
            break;
        }
        i -= 1;

        if i > anchor {
            push_literals(&mut out, &input[anchor..i]);
        }

        // `len` ends up as the match length minus two.
        let src = reference + 3;
        let dst = i + 3;
        let mut end = n - 4 - dst;
        let mut len = 0;
        while len < end {
            if input[src + len] != input[dst + len] {
                end = 0;
            }
            len += 1;
        }
        i += len;

        let d = distance - 1;
        while len > MAX_MATCH_CHUNK {
            out.extend_from_slice(&[(224 + (d >> 8)) as u8, 253, (d & 255) as u8]);
            len -= MAX_MATCH_CHUNK;
        }
        if len < 7 {
            out.extend_from_slice(&[((len << 5) + (d >> 8)) as u8, (d & 255) as u8]);
        } else {
            out.extend_from_slice(&[(224 + (d >> 8)) as u8, (len - 7) as u8, (d & 255) as u8]);
        }

        table[hash(read_u24(input, i))] = i;
        i += 1;
        table[hash(read_u24(input, i))] = i;
        i += 1;
        anchor = i;
    }

    push_literals(&mut out, &input[anchor..]);
    out
}

pub fn flz_decompress(input: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 2);
    let mut i = 0;

    while i < input.len() {
        let ctrl = input[i];
        let kind = ctrl >> 5;

        if kind == 0 {
            let run = ctrl as usize + 1;
            let literals = input
                .get(i + 1..i + 1 + run)
                .ok_or_else(|| anyhow!("truncated literal run at offset {i}: expected {run} bytes"))?;
            out.extend_from_slice(literals);
            i += 1 + run;
            continue;
        }

        let truncated = || anyhow!("truncated match token at offset {i}");
        let (len, low, width) = if kind < 7 {
            (kind as usize + 2, *input.get(i + 1).ok_or_else(truncated)?, 2)
        } else {
            let extra = *input.get(i + 1).ok_or_else(truncated)?;
            (extra as usize + 9, *input.get(i + 2).ok_or_else(truncated)?, 3)
        };
        let distance = ((ctrl as usize & 31) << 8) + low as usize + 1;
        if distance > out.len() {
            bail!(
                "match at offset {i} reaches back {distance} bytes but only {} are decoded",
                out.len()
            );
        }

        // Byte-by-byte: source and destination may overlap.
        let mut from = out.len() - distance;
        for _ in 0..len {
            let b = out[from];
            out.push(b);
            from += 1;
        }
        i += width;
    }

    Ok(out)
}
