use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::format::{
    CodecMode, Separator, BASE64_EXTENSION, DEFAULT_PREVIEW_LEN, DEFAULT_SUFFIX, DEFAULT_ZSTD_LEVEL,
    RECORD_EXTENSION,
};

/// Everything a run needs, passed to [`Pipeline::new`](crate::Pipeline::new).
///
/// Deserializes from JSON with every field optional; missing fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Codec mode for the whole run.
    pub mode: CodecMode,
    /// Only used with `mode = zstd`.
    pub zstd_level: i32,
    /// Appended to the input stem to name outputs; also excluded by discovery.
    pub suffix: String,
    /// Extension of record-text inputs, without the dot.
    pub record_extension: String,
    /// Extension of Base64 inputs, without the dot.
    pub base64_extension: String,
    pub separator: Separator,
    /// Decompress every output and compare it with the input before accepting it.
    pub verify_roundtrip: bool,
    /// Characters of a malformed line kept in its report.
    pub preview_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: CodecMode::default(),
            zstd_level: DEFAULT_ZSTD_LEVEL,
            suffix: DEFAULT_SUFFIX.to_string(),
            record_extension: RECORD_EXTENSION.to_string(),
            base64_extension: BASE64_EXTENSION.to_string(),
            separator: Separator::default(),
            verify_roundtrip: false,
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl PipelineConfig {
    pub fn with_mode(mut self, mode: CodecMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "output suffix must not be empty; outputs would overwrite their inputs".into(),
            ));
        }
        for (field, ext) in [
            ("record_extension", &self.record_extension),
            ("base64_extension", &self.base64_extension),
        ] {
            if ext.is_empty() || ext.contains('.') {
                return Err(PipelineError::InvalidConfig(format!(
                    "{field} must be a bare extension without dots, got '{ext}'"
                )));
            }
        }
        if self.record_extension.eq_ignore_ascii_case(&self.base64_extension) {
            return Err(PipelineError::InvalidConfig(
                "record_extension and base64_extension must differ".into(),
            ));
        }
        if !(1..=22).contains(&self.zstd_level) {
            return Err(PipelineError::InvalidConfig(format!(
                "zstd_level must be within 1..=22, got {}",
                self.zstd_level
            )));
        }
        Ok(())
    }
}
