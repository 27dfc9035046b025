use std::path::PathBuf;

use thiserror::Error;

use crate::record::MalformedRecord;

/// Everything that can go wrong in a batch, classified by blast radius.
///
/// `InputNotFound`, `InputRead` and `OutputWrite` are fatal for one artifact
/// only. `MalformedRecord` and `CodecFailure` are fatal for one record only.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input artifact not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read input artifact {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecord),

    #[error("codec `{codec}` failed on record `{record}`: {reason}")]
    CodecFailure {
        record: String,
        codec: String,
        reason: String,
    },

    #[error("failed to write output artifact {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
