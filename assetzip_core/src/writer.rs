use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use xxhash_rust::xxh3::xxh3_64;

use crate::config::PipelineConfig;
use crate::discovery::ArtifactKind;
use crate::error::{PipelineError, Result};
use crate::format::{Separator, NAME_SEPARATOR};
use crate::outcome::CompressionOutcome;
use crate::payload::encode_payload;

/// Render `(name, bytes)` pairs as record text.
///
/// ```text
/// Name: 0xHEX⏎             (Separator::Line)
/// Name: 0xHEX⏎⏎Other: ...  (Separator::Blank)
/// ```
/// Non-empty output always ends with a single newline. Empty input renders as "".
pub fn render<'a, I>(entries: I, separator: Separator) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let lines: Vec<String> = entries
        .into_iter()
        .map(|(name, bytes)| format!("{name}{NAME_SEPARATOR} {}", encode_payload(bytes)))
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join(separator.as_str());
    out.push('\n');
    out
}

/// Render the successful outcomes, in order, with their compressed payloads.
pub fn render_outcomes(outcomes: &[CompressionOutcome], separator: Separator) -> String {
    render(
        outcomes
            .iter()
            .filter_map(|o| o.record().compressed().map(|c| (o.name(), c))),
        separator,
    )
}

/// `dir/traits.txt` → `dir/traits_compressed.txt`, `dir/logo.b64` →
/// `dir/logo_b64_compressed.txt`.
///
/// Base64 inputs keep their extension as a stem marker and take the record
/// extension, so `logo.txt` and `logo.b64` never share an output.
pub fn output_path_for(input: &Path, kind: ArtifactKind, config: &PipelineConfig) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    let ext: &OsStr = match kind {
        ArtifactKind::Records => input
            .extension()
            .unwrap_or_else(|| OsStr::new(&config.record_extension)),
        ArtifactKind::Base64 => {
            name.push("_");
            name.push(
                input
                    .extension()
                    .unwrap_or_else(|| OsStr::new(&config.base64_extension)),
            );
            OsStr::new(&config.record_extension)
        }
    };
    name.push(&config.suffix);
    name.push(".");
    name.push(ext);
    input.with_file_name(name)
}

/// A successfully persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    pub bytes: usize,
    /// xxh3-64 of the content; equal digests across runs mean identical files.
    pub digest: u64,
}

/// Persist `contents` at `path` all-or-nothing.
///
/// The content goes to a temporary file in the destination directory, is
/// synced, then renamed over `path`. On any failure the temporary file is
/// removed and `path` is left as it was.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<Written> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let fail = |source| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(contents).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;

    Ok(Written {
        path: path.to_path_buf(),
        bytes: contents.len(),
        digest: xxh3_64(contents),
    })
}

/// What happened to an artifact's output.
#[derive(Debug)]
pub enum WriteStatus {
    Written(Written),
    /// No record compressed successfully, so nothing was written.
    Skipped,
    /// Persisting failed. `rendered` holds the full content for a retry.
    Failed {
        error: PipelineError,
        rendered: String,
    },
}

impl WriteStatus {
    pub fn written(&self) -> Option<&Written> {
        match self {
            WriteStatus::Written(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WriteStatus::Failed { .. })
    }
}
