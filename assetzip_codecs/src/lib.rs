mod calldata;
mod flz;
mod lz4_codec;
mod passthrough;
mod zstd_codec;

pub use calldata::CalldataCodec;
pub use flz::FastLzCodec;
pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use zstd_codec::ZstdCodec;

use assetzip_core::{Codec, CodecMode, PipelineConfig};

/// Resolve the codec implementing `mode`.
///
/// `zstd_level` is only consulted for [`CodecMode::Zstd`].
pub fn codec_for_mode(mode: CodecMode, zstd_level: i32) -> Box<dyn Codec> {
    match mode {
        CodecMode::Flz => Box::new(FastLzCodec),
        CodecMode::Calldata => Box::new(CalldataCodec),
        CodecMode::Zstd => Box::new(ZstdCodec::new(zstd_level)),
        CodecMode::Lz4 => Box::new(Lz4Codec),
        CodecMode::PassThrough => Box::new(PassThroughCodec),
    }
}

/// The codec a run configured by `config` should use.
pub fn codec_for_config(config: &PipelineConfig) -> Box<dyn Codec> {
    codec_for_mode(config.mode, config.zstd_level)
}
