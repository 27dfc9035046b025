pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod format;
pub mod outcome;
pub mod payload;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod stats;
pub mod writer;

pub use codec::Codec;
pub use config::PipelineConfig;
pub use discovery::{discover, ArtifactKind};
pub use error::{PipelineError, Result};
pub use format::{CodecMode, Separator};
pub use outcome::{AssetRecord, CompressionOutcome, OutcomeStatus};
pub use pipeline::Pipeline;
pub use record::{MalformedReason, MalformedRecord, ParsedRecord, RecordParser};
pub use report::{ArtifactReport, BatchReport};
pub use stats::{savings_percent, ArtifactStats, BatchSummary};
pub use writer::{WriteStatus, Written};
