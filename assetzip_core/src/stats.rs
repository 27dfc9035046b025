use serde::Serialize;

use crate::outcome::{CompressionOutcome, OutcomeStatus};

/// `(1 - compressed / original) * 100`, or `0.0` for an empty original.
///
/// Negative when the codec expanded the payload.
pub fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}

/// Round to two decimal places, the precision every report uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Counts and byte totals for one artifact. Only successful outcomes contribute bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactStats {
    pub records: usize,
    pub compressed: usize,
    pub parse_skipped: usize,
    pub codec_failed: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl ArtifactStats {
    pub fn from_outcomes(outcomes: &[CompressionOutcome]) -> Self {
        let mut stats = Self::default();
        for outcome in outcomes {
            stats.record(outcome);
        }
        stats
    }

    pub fn record(&mut self, outcome: &CompressionOutcome) {
        self.records += 1;
        match outcome.status() {
            OutcomeStatus::Success => {
                self.compressed += 1;
                self.original_bytes += outcome.original_bytes() as u64;
                self.compressed_bytes += outcome.compressed_bytes().unwrap_or_default() as u64;
            }
            OutcomeStatus::ParseSkipped => self.parse_skipped += 1,
            OutcomeStatus::CodecFailed => self.codec_failed += 1,
        }
    }

    pub fn excluded(&self) -> usize {
        self.parse_skipped + self.codec_failed
    }

    pub fn saved_bytes(&self) -> i64 {
        self.original_bytes as i64 - self.compressed_bytes as i64
    }

    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.original_bytes, self.compressed_bytes)
    }
}

/// Run-wide totals, accumulated additively across artifacts.
///
/// The aggregate percentage comes from the totals, so large records weigh
/// proportionally more than small ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub file_count: usize,
    pub records_compressed: usize,
    pub records_excluded: usize,
    pub total_original_bytes: u64,
    pub total_compressed_bytes: u64,
}

impl BatchSummary {
    pub fn absorb(&mut self, stats: &ArtifactStats) {
        self.file_count += 1;
        self.records_compressed += stats.compressed;
        self.records_excluded += stats.excluded();
        self.total_original_bytes += stats.original_bytes;
        self.total_compressed_bytes += stats.compressed_bytes;
    }

    pub fn saved_bytes(&self) -> i64 {
        self.total_original_bytes as i64 - self.total_compressed_bytes as i64
    }

    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.total_original_bytes, self.total_compressed_bytes)
    }
}
