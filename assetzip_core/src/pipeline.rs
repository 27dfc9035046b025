use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info, info_span, warn};

use crate::codec::Codec;
use crate::config::PipelineConfig;
use crate::discovery::{discover, ArtifactKind};
use crate::error::{PipelineError, Result};
use crate::outcome::{AssetRecord, CompressionOutcome};
use crate::payload::decode_payload;
use crate::record::{MalformedReason, MalformedRecord, RecordParser};
use crate::report::{ArtifactReport, BatchReport};
use crate::stats::ArtifactStats;
use crate::writer::{output_path_for, render_outcomes, write_atomic, WriteStatus};

/// Batch compression orchestrator.
///
/// # Per-record lifecycle
/// ```text
/// line ─┬─ malformed ──────────────────────────► ParseSkipped (logged, excluded)
///       └─ Parsed ─► codec ─┬─ Ok ─► Compressed ─► written + counted
///                           └─ Err ► CodecFailed ─► logged, excluded
/// ```
/// A record's failure never stops the batch; an artifact's read failure never
/// stops the run. Codec calls happen one at a time, in input order.
pub struct Pipeline {
    config: PipelineConfig,
    codec: Box<dyn Codec>,
}

impl Pipeline {
    /// Build a pipeline around an injected codec.
    ///
    /// Fails if the config is invalid or the codec does not implement
    /// `config.mode`.
    pub fn new(config: PipelineConfig, codec: Box<dyn Codec>) -> Result<Self> {
        config.validate()?;
        if codec.mode() != config.mode {
            return Err(PipelineError::InvalidConfig(format!(
                "codec `{}` implements mode {} but the run is configured for {}",
                codec.name(),
                codec.mode(),
                config.mode
            )));
        }
        Ok(Self { config, codec })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    fn kind_of(&self, path: &Path) -> ArtifactKind {
        ArtifactKind::from_path(path, &self.config).unwrap_or(ArtifactKind::Records)
    }

    // ── Per-record ─────────────────────────────────────────────────────────

    /// Compress one parsed record. Never fails; failures become a `CodecFailed` outcome.
    pub fn compress_record(&self, line: usize, mut record: AssetRecord) -> CompressionOutcome {
        match self.encode(record.original()) {
            Ok(compressed) => {
                debug!(
                    record = record.name(),
                    original = record.original().len(),
                    compressed = compressed.len(),
                    "compressed record"
                );
                record.set_compressed(compressed);
                CompressionOutcome::compressed(line, record)
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    record = record.name(),
                    line,
                    codec = self.codec.name(),
                    error = %reason,
                    "codec failed; record excluded"
                );
                CompressionOutcome::codec_failed(line, record, self.codec.name(), reason)
            }
        }
    }

    fn encode(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let compressed = self.codec.compress(raw)?;

        if let Some(bound) = self.codec.max_compressed_len(raw.len()) {
            if compressed.len() > bound {
                anyhow::bail!(
                    "output of {} bytes exceeds the documented worst case of {} bytes for {} input bytes",
                    compressed.len(),
                    bound,
                    raw.len()
                );
            }
        }

        if self.config.verify_roundtrip {
            let restored = self
                .codec
                .decompress(&compressed)
                .context("round-trip verification")?;
            if restored != raw {
                anyhow::bail!(
                    "round-trip mismatch: {} input bytes came back as {} bytes",
                    raw.len(),
                    restored.len()
                );
            }
        }

        Ok(compressed)
    }

    fn skip(&self, malformed: MalformedRecord) -> CompressionOutcome {
        warn!(
            line = malformed.line,
            excerpt = %malformed.excerpt,
            reason = %malformed.reason,
            "skipping malformed record"
        );
        CompressionOutcome::parse_skipped(malformed)
    }

    // ── Per-artifact content ───────────────────────────────────────────────

    /// Compress every record in `text`, one outcome per non-blank line, in order.
    pub fn compress_text(&self, text: &str) -> Vec<CompressionOutcome> {
        let parser = RecordParser::new(text).with_preview_len(self.config.preview_len);
        parser
            .records()
            .map(|item| {
                let parsed = match item {
                    Ok(parsed) => parsed,
                    Err(malformed) => return self.skip(malformed),
                };
                match decode_payload(parsed.payload) {
                    Ok(bytes) => self.compress_record(parsed.line, AssetRecord::new(parsed.name, bytes)),
                    Err(e) => self.skip(MalformedRecord::new(
                        parsed.line,
                        parsed.payload,
                        e.into(),
                        self.config.preview_len,
                    )),
                }
            })
            .collect()
    }

    /// Decode a Base64 string and compress it as a single record called `name`.
    pub fn compress_base64(&self, name: &str, text: &str) -> Vec<CompressionOutcome> {
        let cleaned: String = text.split_whitespace().collect();
        let outcome = match BASE64.decode(cleaned.as_bytes()) {
            Ok(bytes) if bytes.is_empty() => self.skip(MalformedRecord::new(
                1,
                text,
                MalformedReason::Base64("decodes to zero bytes".into()),
                self.config.preview_len,
            )),
            Ok(bytes) => self.compress_record(1, AssetRecord::new(name, bytes)),
            Err(e) => self.skip(MalformedRecord::new(
                1,
                text,
                MalformedReason::Base64(e.to_string()),
                self.config.preview_len,
            )),
        };
        vec![outcome]
    }

    /// Parse a compressed artifact and restore each record's original bytes.
    pub fn expand_text(&self, text: &str) -> Vec<Result<AssetRecord>> {
        let parser = RecordParser::new(text).with_preview_len(self.config.preview_len);
        parser
            .records()
            .map(|item| -> Result<AssetRecord> {
                let parsed = item?;
                let compressed = decode_payload(parsed.payload).map_err(|e| {
                    MalformedRecord::new(parsed.line, parsed.payload, e.into(), self.config.preview_len)
                })?;
                let restored = self
                    .codec
                    .decompress(&compressed)
                    .map_err(|e| PipelineError::CodecFailure {
                        record: parsed.name.to_string(),
                        codec: self.codec.name().to_string(),
                        reason: format!("{e:#}"),
                    })?;
                Ok(AssetRecord::new(parsed.name, restored))
            })
            .collect()
    }

    // ── Artifacts ──────────────────────────────────────────────────────────

    /// Read, compress and write one artifact.
    ///
    /// Returns `Err` only when the input cannot be read. A failed write is
    /// reported in [`ArtifactReport::write`] with the rendered content kept
    /// for [`retry_write`](Self::retry_write).
    pub fn process_artifact(&self, path: &Path) -> Result<ArtifactReport> {
        let _span = info_span!("artifact", path = %path.display()).entered();

        let kind = self.kind_of(path);
        let text = read_input(path)?;

        let outcomes = match kind {
            ArtifactKind::Records => self.compress_text(&text),
            ArtifactKind::Base64 => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.compress_base64(&name, &text)
            }
        };
        let stats = ArtifactStats::from_outcomes(&outcomes);
        let output = output_path_for(path, kind, &self.config);

        let write = if stats.compressed == 0 {
            warn!("no records compressed; output not written");
            WriteStatus::Skipped
        } else {
            let rendered = render_outcomes(&outcomes, self.config.separator);
            persist(&output, rendered)
        };

        Ok(ArtifactReport {
            input: path.to_path_buf(),
            kind,
            output,
            outcomes,
            stats,
            write,
        })
    }

    /// Retry a failed write from the content kept in the report and return
    /// the new write status. Leaves other statuses untouched.
    pub fn retry_write<'r>(&self, report: &'r mut ArtifactReport) -> &'r WriteStatus {
        if report.write.is_failed() {
            let status = std::mem::replace(&mut report.write, WriteStatus::Skipped);
            if let WriteStatus::Failed { rendered, .. } = status {
                report.write = persist(&report.output, rendered);
            }
        }
        &report.write
    }

    /// Process each artifact in order. Unreadable artifacts are recorded in
    /// [`BatchReport::failed`] and the run moves on.
    ///
    /// An artifact whose output path was already written (or attempted)
    /// earlier in the run is not processed and fails with `OutputWrite`.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        for input in inputs {
            let input = input.as_ref();
            let output = output_path_for(input, self.kind_of(input), &self.config);
            if let Some(first) = claimed.get(&output) {
                let err = PipelineError::OutputWrite {
                    path: output,
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!(
                            "{} and {} map to the same output",
                            first.display(),
                            input.display()
                        ),
                    ),
                };
                warn!(error = %err, "artifact skipped");
                report.failed.push(err);
                continue;
            }
            match self.process_artifact(input) {
                Ok(artifact) => {
                    if !matches!(artifact.write, WriteStatus::Skipped) {
                        claimed.insert(artifact.output.clone(), input.to_path_buf());
                    }
                    report.summary.absorb(&artifact.stats);
                    report.artifacts.push(artifact);
                }
                Err(err) => {
                    warn!(error = %err, "artifact skipped");
                    report.failed.push(err);
                }
            }
        }
        report
    }

    /// Discover artifacts in `dir` and [`run`](Self::run) over them.
    pub fn run_dir(&self, dir: &Path) -> Result<BatchReport> {
        let inputs = discover(dir, &self.config)?;
        info!(dir = %dir.display(), count = inputs.len(), "discovered artifacts");
        Ok(self.run(&inputs))
    }
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => PipelineError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => PipelineError::InputRead {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn persist(output: &Path, rendered: String) -> WriteStatus {
    match write_atomic(output, rendered.as_bytes()) {
        Ok(written) => {
            info!(
                output = %written.path.display(),
                bytes = written.bytes,
                digest = %format_args!("{:016x}", written.digest),
                "wrote compressed artifact"
            );
            WriteStatus::Written(written)
        }
        Err(error) => {
            warn!(error = %error, "output write failed; results kept for retry");
            WriteStatus::Failed { error, rendered }
        }
    }
}
