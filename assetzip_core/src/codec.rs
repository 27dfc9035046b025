use crate::format::CodecMode;

/// Core compression abstraction, injected into the [`Pipeline`](crate::Pipeline).
///
/// Each `Codec` implementation:
/// - Handles exactly one [`CodecMode`]; the pipeline refuses a codec whose
///   mode differs from the configured one.
/// - Must be deterministic: identical input always yields identical output.
///   Re-running a batch relies on this to reproduce byte-identical artifacts.
/// - Reports failure as an `Err`, never by panicking, so one bad record can be
///   excluded without aborting the batch.
pub trait Codec: Send + Sync {
    /// The mode this codec implements.
    fn mode(&self) -> CodecMode;

    /// Human-readable codec name for logs and reports.
    fn name(&self) -> &'static str;

    /// Compress one record payload.
    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Reverse `compress`.
    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Documented worst-case output size for `raw_len` input bytes.
    ///
    /// When `Some`, the pipeline treats larger output as a codec failure.
    fn max_compressed_len(&self, _raw_len: usize) -> Option<usize> {
        None
    }
}
