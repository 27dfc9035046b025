use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

/// How an input artifact's content is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// `Name: 0xHEX` lines.
    Records,
    /// A single Base64 string, treated as one record named after the file.
    Base64,
}

impl ArtifactKind {
    /// Classify by extension; `None` for files the pipeline does not handle.
    pub fn from_path(path: &Path, config: &PipelineConfig) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case(&config.record_extension) {
            Some(ArtifactKind::Records)
        } else if ext.eq_ignore_ascii_case(&config.base64_extension) {
            Some(ArtifactKind::Base64)
        } else {
            None
        }
    }
}

/// Whether `path` looks like an artifact this tool produced.
pub fn is_compressed_artifact(path: &Path, suffix: &str) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(suffix))
}

/// List the artifacts in `dir` that a run should process, sorted by file name.
///
/// Selects regular files with a record or Base64 extension and skips any
/// whose stem already carries the output suffix.
pub fn discover(dir: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => PipelineError::InputNotFound {
            path: dir.to_path_buf(),
        },
        _ => PipelineError::InputRead {
            path: dir.to_path_buf(),
            source,
        },
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::InputRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if ArtifactKind::from_path(&path, config).is_none() {
            continue;
        }
        if is_compressed_artifact(&path, &config.suffix) {
            debug!(path = %path.display(), "skipping already-compressed artifact");
            continue;
        }
        found.push(path);
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}
