use std::path::PathBuf;

use crate::discovery::ArtifactKind;
use crate::error::PipelineError;
use crate::outcome::CompressionOutcome;
use crate::stats::{ArtifactStats, BatchSummary};
use crate::writer::WriteStatus;

/// Everything the pipeline learned about one input artifact.
#[derive(Debug)]
pub struct ArtifactReport {
    pub input: PathBuf,
    pub kind: ArtifactKind,
    pub output: PathBuf,
    /// One entry per non-blank input line, in input order.
    pub outcomes: Vec<CompressionOutcome>,
    pub stats: ArtifactStats,
    pub write: WriteStatus,
}

impl ArtifactReport {
    /// Errors for every excluded record, in input order.
    pub fn record_failures(&self) -> Vec<PipelineError> {
        self.outcomes.iter().filter_map(CompressionOutcome::failure).collect()
    }

    pub fn successes(&self) -> impl Iterator<Item = &CompressionOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Artifacts that were read, in processing order, including ones whose write failed.
    pub artifacts: Vec<ArtifactReport>,
    /// Artifacts that were not processed: unreadable, or colliding with an earlier output.
    pub failed: Vec<PipelineError>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn write_failures(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.artifacts.iter().filter(|a| a.write.is_failed())
    }

    /// True when any artifact failed to read or write. Excluded records alone don't count.
    pub fn has_fatal_errors(&self) -> bool {
        !self.failed.is_empty() || self.write_failures().next().is_some()
    }
}
