use assetzip_core::format::DEFAULT_ZSTD_LEVEL;
use assetzip_core::{Codec, CodecMode};

/// Zstandard codec, one frame per record.
///
/// Off-chain baseline only. Frame overhead (magic, header) dominates on the
/// small payloads typical of trait assets, so expect it to lose to `flz`
/// below a few hundred bytes.
pub struct ZstdCodec {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Codec for ZstdCodec {
    fn mode(&self) -> CodecMode {
        CodecMode::Zstd
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let compressed = zstd::bulk::compress(raw, self.level)?;
        Ok(compressed)
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        // The frame carries its own content size.
        let raw = zstd::decode_all(compressed)?;
        Ok(raw)
    }

    fn max_compressed_len(&self, raw_len: usize) -> Option<usize> {
        Some(zstd::zstd_safe::compress_bound(raw_len))
    }
}
