use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Prefix carried by every hex payload, on input and output.
pub const HEX_PREFIX: &str = "0x";

/// Separates the record name from its payload: `Name: 0xHEX`.
pub const NAME_SEPARATOR: char = ':';

/// Suffix appended to an input's file stem to name its compressed artifact.
/// Discovery also uses it to skip artifacts this tool already produced.
pub const DEFAULT_SUFFIX: &str = "_compressed";

/// Extension of record-text artifacts (`Name: 0xHEX` per line).
pub const RECORD_EXTENSION: &str = "txt";

/// Extension of Base64 artifacts (one Base64 string per file).
pub const BASE64_EXTENSION: &str = "b64";

/// Characters of an offending line kept when reporting it as malformed.
pub const DEFAULT_PREVIEW_LEN: usize = 50;

/// Default zstd level for the `zstd` baseline codec.
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

// ── Codec modes ────────────────────────────────────────────────────────────

/// Which compression transform a run uses. Chosen once per run, never per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecMode {
    /// FastLZ, the generic mode. Decodable on-chain by `LibZip.flzDecompress`.
    #[default]
    Flz,
    /// Zero/0xff run-length transform tuned for calldata gas pricing.
    /// Decodable on-chain by `LibZip.cdDecompress`.
    Calldata,
    /// Off-chain zstd baseline, for comparing ratios only.
    Zstd,
    /// Off-chain LZ4 baseline, for comparing ratios only.
    Lz4,
    /// Compression disabled: payloads are re-emitted verbatim.
    PassThrough,
}

impl CodecMode {
    pub const ALL: [CodecMode; 5] = [
        CodecMode::Flz,
        CodecMode::Calldata,
        CodecMode::Zstd,
        CodecMode::Lz4,
        CodecMode::PassThrough,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodecMode::Flz => "flz",
            CodecMode::Calldata => "calldata",
            CodecMode::Zstd => "zstd",
            CodecMode::Lz4 => "lz4",
            CodecMode::PassThrough => "passthrough",
        }
    }

    /// Whether the output of this mode can be decoded by the on-chain LibZip routines.
    pub fn is_onchain(&self) -> bool {
        matches!(self, CodecMode::Flz | CodecMode::Calldata)
    }
}

impl fmt::Display for CodecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flz" | "fastlz" | "generic" => Ok(CodecMode::Flz),
            "calldata" | "cd" => Ok(CodecMode::Calldata),
            "zstd" | "z" => Ok(CodecMode::Zstd),
            "lz4" | "l" => Ok(CodecMode::Lz4),
            "passthrough" | "pass" | "none" => Ok(CodecMode::PassThrough),
            other => Err(PipelineError::InvalidConfig(format!(
                "unknown codec mode '{other}'. Valid options: flz, calldata, zstd, lz4, passthrough"
            ))),
        }
    }
}

// ── Output layout ──────────────────────────────────────────────────────────

/// How consecutive records are separated in a rendered artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// One record per line.
    #[default]
    Line,
    /// A blank line between records.
    Blank,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Line => "\n",
            Separator::Blank => "\n\n",
        }
    }
}
