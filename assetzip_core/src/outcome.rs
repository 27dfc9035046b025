use serde::Serialize;

use crate::error::PipelineError;
use crate::record::MalformedRecord;
use crate::stats::savings_percent;

/// A named asset and its payload, before and after compression.
///
/// The compressed payload is set at most once, by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    name: String,
    original: Vec<u8>,
    compressed: Option<Vec<u8>>,
}

impl AssetRecord {
    pub fn new(name: impl Into<String>, original: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            original,
            compressed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> &[u8] {
        &self.original
    }

    pub fn compressed(&self) -> Option<&[u8]> {
        self.compressed.as_deref()
    }

    pub(crate) fn set_compressed(&mut self, bytes: Vec<u8>) {
        debug_assert!(self.compressed.is_none(), "record {} compressed twice", self.name);
        self.compressed = Some(bytes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    ParseSkipped,
    CodecFailed,
}

#[derive(Debug, Clone)]
enum Disposition {
    Compressed,
    Skipped(MalformedRecord),
    Failed { codec: String, reason: String },
}

/// Result of pushing one input line through the pipeline.
///
/// Only the constructors below can build one, so `compressed_bytes()` is
/// `Some` exactly when `status()` is `Success`.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    line: usize,
    record: AssetRecord,
    disposition: Disposition,
}

impl CompressionOutcome {
    pub(crate) fn compressed(line: usize, record: AssetRecord) -> Self {
        debug_assert!(record.compressed.is_some());
        Self {
            line,
            record,
            disposition: Disposition::Compressed,
        }
    }

    pub(crate) fn parse_skipped(malformed: MalformedRecord) -> Self {
        Self {
            line: malformed.line,
            record: AssetRecord::new(malformed.excerpt.clone(), Vec::new()),
            disposition: Disposition::Skipped(malformed),
        }
    }

    pub(crate) fn codec_failed(line: usize, mut record: AssetRecord, codec: &str, reason: String) -> Self {
        record.compressed = None;
        Self {
            line,
            record,
            disposition: Disposition::Failed {
                codec: codec.to_string(),
                reason,
            },
        }
    }

    /// 1-based line the record came from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Record name, or the line excerpt for skipped lines.
    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    pub fn status(&self) -> OutcomeStatus {
        match self.disposition {
            Disposition::Compressed => OutcomeStatus::Success,
            Disposition::Skipped(_) => OutcomeStatus::ParseSkipped,
            Disposition::Failed { .. } => OutcomeStatus::CodecFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == OutcomeStatus::Success
    }

    pub fn original_bytes(&self) -> usize {
        self.record.original.len()
    }

    pub fn compressed_bytes(&self) -> Option<usize> {
        self.record.compressed().map(<[u8]>::len)
    }

    /// Per-record savings; `None` unless the record was compressed.
    pub fn savings_percent(&self) -> Option<f64> {
        self.compressed_bytes()
            .map(|c| savings_percent(self.original_bytes() as u64, c as u64))
    }

    /// The error that excluded this record, if any.
    pub fn failure(&self) -> Option<PipelineError> {
        match &self.disposition {
            Disposition::Compressed => None,
            Disposition::Skipped(malformed) => Some(PipelineError::MalformedRecord(malformed.clone())),
            Disposition::Failed { codec, reason } => Some(PipelineError::CodecFailure {
                record: self.record.name.clone(),
                codec: codec.clone(),
                reason: reason.clone(),
            }),
        }
    }
}
