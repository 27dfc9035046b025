use assetzip_core::{Codec, CodecMode};
use lz4_flex::block::get_maximum_output_size;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};

/// LZ4 block codec with a 4-byte length prefix.
///
/// Off-chain baseline only: there is no on-chain LZ4 decoder, so use it to
/// compare ratios against `flz`, not to produce deployable payloads.
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn mode(&self) -> CodecMode {
        CodecMode::Lz4
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(compress_prepend_size(raw))
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        let raw = decompress_size_prepended(compressed)
            .map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))?;
        Ok(raw)
    }

    fn max_compressed_len(&self, raw_len: usize) -> Option<usize> {
        Some(get_maximum_output_size(raw_len) + 4)
    }
}
