use std::iter;

use anyhow::anyhow;
use assetzip_core::{Codec, CodecMode};

/// Calldata codec, byte-compatible with Solady's `LibZip.cdCompress` and
/// decodable on-chain by `LibZip.cdDecompress`.
///
/// Calldata charges far less for zero bytes than for non-zero ones, so this
/// transform only collapses runs and leaves everything else alone:
/// ```text
/// 00 0rrrrrrr    r+1 zero bytes   (runs of up to 128)
/// 00 1rrrrrrr    r+1 0xff bytes   (runs of up to 32)
/// xx             any other byte, verbatim
/// ```
/// The first four output bytes are inverted so that the payload never starts
/// with a zero function selector.
///
/// Worst case output is `2n` bytes, reached by isolated zero or 0xff bytes.
pub struct CalldataCodec;

const MAX_ZERO_RUN: usize = 0x80;
const MAX_FF_RUN: usize = 0x20;
const FF_RUN_FLAG: u8 = 0x80;
const INVERTED_PREFIX: usize = 4;

impl Codec for CalldataCodec {
    fn mode(&self) -> CodecMode {
        CodecMode::Calldata
    }

    fn name(&self) -> &'static str {
        "calldata"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(cd_compress(raw))
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        cd_decompress(compressed)
    }

    fn max_compressed_len(&self, raw_len: usize) -> Option<usize> {
        Some(raw_len * 2)
    }
}

#[inline]
fn mask(offset: usize) -> u8 {
    if offset < INVERTED_PREFIX {
        0xff
    } else {
        0x00
    }
}

struct Encoder {
    out: Vec<u8>,
}

impl Encoder {
    fn push(&mut self, byte: u8) {
        let m = mask(self.out.len());
        self.out.push(byte ^ m);
    }

    fn run(&mut self, ff: bool, len: usize) {
        self.push(0x00);
        self.push((len - 1) as u8 | if ff { FF_RUN_FLAG } else { 0 });
    }
}

pub fn cd_compress(input: &[u8]) -> Vec<u8> {
    let mut enc = Encoder {
        out: Vec::with_capacity(input.len()),
    };
    let mut zeros = 0;
    let mut ffs = 0;

    for &byte in input {
        match byte {
            0x00 => {
                if ffs > 0 {
                    enc.run(true, ffs);
                    ffs = 0;
                }
                zeros += 1;
                if zeros == MAX_ZERO_RUN {
                    enc.run(false, zeros);
                    zeros = 0;
                }
            }
            0xff => {
                if zeros > 0 {
                    enc.run(false, zeros);
                    zeros = 0;
                }
                ffs += 1;
                if ffs == MAX_FF_RUN {
                    enc.run(true, ffs);
                    ffs = 0;
                }
            }
            other => {
                if ffs > 0 {
                    enc.run(true, ffs);
                    ffs = 0;
                }
                if zeros > 0 {
                    enc.run(false, zeros);
                    zeros = 0;
                }
                enc.push(other);
            }
        }
    }
    if ffs > 0 {
        enc.run(true, ffs);
    }
    if zeros > 0 {
        enc.run(false, zeros);
    }
    enc.out
}

pub fn cd_decompress(input: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 2);
    let mut i = 0;

    while i < input.len() {
        let byte = input[i] ^ mask(i);
        i += 1;
        if byte != 0x00 {
            out.push(byte);
            continue;
        }

        let tag = input
            .get(i)
            .map(|b| b ^ mask(i))
            .ok_or_else(|| anyhow!("truncated run marker at offset {}", i - 1))?;
        i += 1;

        let len = (tag & 0x7f) as usize + 1;
        let ffs = if tag & FF_RUN_FLAG != 0 { len.min(MAX_FF_RUN) } else { 0 };
        out.extend(iter::repeat(0xff).take(ffs));
        out.extend(iter::repeat(0x00).take(len - ffs));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_run_collapses_to_two_bytes() {
        // 00 0f with both bytes inside the inverted prefix.
        assert_eq!(cd_compress(&[0u8; 16]), vec![0xff, 0xf0]);
    }

    #[test]
    fn prefix_is_inverted() {
        assert_eq!(cd_compress(&[0xde, 0xad, 0xbe, 0xef]), vec![0x21, 0x52, 0x41, 0x10]);
        assert_eq!(cd_decompress(&[0x21, 0x52, 0x41, 0x10]).unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn isolated_zero_between_ff_doubles() {
        let encoded = cd_compress(&[0x00, 0xff, 0x00]);
        assert_eq!(encoded, vec![0xff, 0xff, 0xff, 0x7f, 0x00, 0x00]);
        assert_eq!(cd_decompress(&encoded).unwrap(), vec![0x00, 0xff, 0x00]);
    }

    #[test]
    fn rejects_dangling_run_marker() {
        assert!(cd_decompress(&[0xff]).is_err());
    }
}
