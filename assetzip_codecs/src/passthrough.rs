use assetzip_core::{Codec, CodecMode};

/// No-op codec: payloads are re-emitted verbatim.
///
/// Used when compression is switched off, e.g. to turn a Base64 asset into
/// raw hex, or to measure a batch without changing it.
pub struct PassThroughCodec;

impl Codec for PassThroughCodec {
    fn mode(&self) -> CodecMode {
        CodecMode::PassThrough
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(compressed.to_vec())
    }

    fn max_compressed_len(&self, raw_len: usize) -> Option<usize> {
        Some(raw_len)
    }
}
