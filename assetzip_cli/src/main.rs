use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use xxhash_rust::xxh3::xxh3_64;

use assetzip_codecs::codec_for_config;
use assetzip_core::payload::{decode_payload, encode_payload};
use assetzip_core::stats::round2;
use assetzip_core::writer::{render, write_atomic};
use assetzip_core::{
    ArtifactReport, ArtifactStats, BatchReport, BatchSummary, CodecMode, CompressionOutcome,
    OutcomeStatus, Pipeline, PipelineConfig, RecordParser, Separator, WriteStatus,
};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "assetzip",
    about = "Batch-compress `Name: 0xHEX` asset records for on-chain storage",
    version
)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress record artifacts into `<stem>_compressed.<ext>` beside each input
    Compress {
        /// Artifacts to compress, in order. Defaults to everything discovered in --dir
        inputs: Vec<PathBuf>,
        /// Directory to scan for .txt / .b64 artifacts
        #[arg(short, long, conflicts_with = "inputs")]
        dir: Option<PathBuf>,
        /// Print a machine-readable report instead of the table
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Restore the original payloads of a compressed artifact
    Decompress {
        /// Compressed artifact
        input: PathBuf,
        /// Destination for the restored records
        output: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// List each record's size and digest, and any malformed lines
    Inspect {
        /// Record artifact (compressed or not)
        file: PathBuf,
    },
    /// Decode a Base64 asset and print it as a hex record
    Base64 {
        /// Base64 string (ignored when --input is given)
        #[arg(required_unless_present = "input")]
        data: Option<String>,
        /// Read the Base64 string from a file
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Record name to print (default: file stem, or `asset`)
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Pipeline settings shared by the subcommands that run a codec.
#[derive(Args)]
struct PipelineArgs {
    /// JSON file with pipeline settings; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Codec: flz | calldata | zstd | lz4 | passthrough
    #[arg(short, long)]
    codec: Option<String>,
    /// Zstd compression level (1–22, only used with --codec zstd)
    #[arg(long)]
    zstd_level: Option<i32>,
    /// Suffix appended to output stems
    #[arg(long)]
    suffix: Option<String>,
    /// Separate output records with an empty line
    #[arg(long)]
    blank_lines: bool,
    /// Decompress every result and compare it with the input
    #[arg(long)]
    verify: bool,
}

impl PipelineArgs {
    fn load(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config {:?}", path))?;
                serde_json::from_str(&raw).with_context(|| format!("parsing config {:?}", path))?
            }
            None => PipelineConfig::default(),
        };

        if let Some(codec) = &self.codec {
            config.mode = codec.parse::<CodecMode>()?;
        }
        if let Some(level) = self.zstd_level {
            config.zstd_level = level;
        }
        if let Some(suffix) = &self.suffix {
            config.suffix = suffix.clone();
        }
        if self.blank_lines {
            config.separator = Separator::Blank;
        }
        if self.verify {
            config.verify_roundtrip = true;
        }
        Ok(config)
    }

    fn pipeline(&self) -> anyhow::Result<Pipeline> {
        let config = self.load()?;
        let codec = codec_for_config(&config);
        Ok(Pipeline::new(config, codec)?)
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("assetzip=debug")
        } else {
            EnvFilter::new("assetzip=info")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

/// `1234567` → `1,234,567`
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── JSON report ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunView<'a> {
    codec: &'a str,
    mode: CodecMode,
    artifacts: Vec<ArtifactView<'a>>,
    failed: Vec<String>,
    summary: SummaryView,
}

#[derive(Serialize)]
struct ArtifactView<'a> {
    input: &'a Path,
    output: &'a Path,
    write: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    write_error: Option<String>,
    stats: &'a ArtifactStats,
    savings_percent: f64,
    records: Vec<RecordView<'a>>,
}

#[derive(Serialize)]
struct RecordView<'a> {
    line: usize,
    name: &'a str,
    status: OutcomeStatus,
    original_bytes: usize,
    compressed_bytes: Option<usize>,
    savings_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct SummaryView {
    #[serde(flatten)]
    totals: BatchSummary,
    saved_bytes: i64,
    savings_percent: f64,
}

impl<'a> RecordView<'a> {
    fn new(outcome: &'a CompressionOutcome) -> Self {
        Self {
            line: outcome.line(),
            name: outcome.name(),
            status: outcome.status(),
            original_bytes: outcome.original_bytes(),
            compressed_bytes: outcome.compressed_bytes(),
            savings_percent: outcome.savings_percent().map(round2),
            error: outcome.failure().map(|e| e.to_string()),
        }
    }
}

impl<'a> ArtifactView<'a> {
    fn new(artifact: &'a ArtifactReport) -> Self {
        let (write, digest, write_error) = match &artifact.write {
            WriteStatus::Written(w) => ("written", Some(format!("{:016x}", w.digest)), None),
            WriteStatus::Skipped => ("skipped", None, None),
            WriteStatus::Failed { error, .. } => ("failed", None, Some(error.to_string())),
        };
        Self {
            input: &artifact.input,
            output: &artifact.output,
            write,
            digest,
            write_error,
            stats: &artifact.stats,
            savings_percent: round2(artifact.stats.savings_percent()),
            records: artifact.outcomes.iter().map(RecordView::new).collect(),
        }
    }
}

fn print_json(pipeline: &Pipeline, report: &BatchReport) -> anyhow::Result<()> {
    let view = RunView {
        codec: pipeline.codec_name(),
        mode: pipeline.config().mode,
        artifacts: report.artifacts.iter().map(ArtifactView::new).collect(),
        failed: report.failed.iter().map(|e| e.to_string()).collect(),
        summary: SummaryView {
            totals: report.summary,
            saved_bytes: report.summary.saved_bytes(),
            savings_percent: round2(report.summary.savings_percent()),
        },
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

// ── Human report ───────────────────────────────────────────────────────────

fn print_outcome(outcome: &CompressionOutcome) {
    match (outcome.compressed_bytes(), outcome.savings_percent()) {
        (Some(compressed), Some(savings)) => println!(
            "  {:<24}  {:>12} → {:>12}  {:>7.2}%",
            outcome.name(),
            human_bytes(outcome.original_bytes() as u64),
            human_bytes(compressed as u64),
            savings
        ),
        _ => {
            if let Some(err) = outcome.failure() {
                println!("  ! {}", err);
            }
        }
    }
}

fn print_artifact(artifact: &ArtifactReport) {
    println!();
    println!(
        "=== {} → {} ===",
        file_label(&artifact.input),
        file_label(&artifact.output)
    );
    for outcome in &artifact.outcomes {
        print_outcome(outcome);
    }
    let stats = &artifact.stats;
    println!(
        "  records        : {} compressed, {} skipped, {} failed",
        stats.compressed, stats.parse_skipped, stats.codec_failed
    );
    println!(
        "  size           : {} → {} ({:.2}%)",
        human_bytes(stats.original_bytes),
        human_bytes(stats.compressed_bytes),
        stats.savings_percent()
    );
    match &artifact.write {
        WriteStatus::Written(w) => println!("  checksum       : {:016x}", w.digest),
        WriteStatus::Skipped => println!("  output         : not written (nothing compressed)"),
        WriteStatus::Failed { error, .. } => println!("  output         : FAILED ({})", error),
    }
}

fn print_human(pipeline: &Pipeline, report: &BatchReport, elapsed_secs: f64) {
    for artifact in &report.artifacts {
        print_artifact(artifact);
    }
    for err in &report.failed {
        println!();
        println!("  ! {}", err);
    }

    let summary = &report.summary;
    println!();
    println!("=== Summary ===");
    println!("  codec          : {}", pipeline.codec_name());
    println!("  files          : {}", summary.file_count);
    println!("  records        : {}", summary.records_compressed);
    println!("  excluded       : {}", summary.records_excluded);
    println!(
        "  original       : {} bytes ({})",
        group_digits(summary.total_original_bytes),
        human_bytes(summary.total_original_bytes)
    );
    println!(
        "  compressed     : {} bytes ({})",
        group_digits(summary.total_compressed_bytes),
        human_bytes(summary.total_compressed_bytes)
    );
    println!("  saved          : {} bytes", summary.saved_bytes());
    println!("  savings        : {:.2}%", summary.savings_percent());
    println!("  elapsed        : {:.3}s", elapsed_secs);
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(
    inputs: Vec<PathBuf>,
    dir: Option<PathBuf>,
    json: bool,
    args: &PipelineArgs,
) -> anyhow::Result<()> {
    let pipeline = args.pipeline()?;
    let t0 = Instant::now();

    let mut report = if inputs.is_empty() {
        let dir = dir.unwrap_or_else(|| PathBuf::from("."));
        pipeline.run_dir(&dir)?
    } else {
        pipeline.run(&inputs)
    };

    // One retry for outputs that failed to persist; the content is still in memory.
    for artifact in report.artifacts.iter_mut().filter(|a| a.write.is_failed()) {
        warn!(output = %artifact.output.display(), "retrying failed write");
        pipeline.retry_write(artifact);
    }

    if json {
        print_json(&pipeline, &report)?;
    } else {
        print_human(&pipeline, &report, t0.elapsed().as_secs_f64());
    }

    if report.has_fatal_errors() {
        let count = report.failed.len() + report.write_failures().count();
        anyhow::bail!("{} artifact(s) could not be read or written", count);
    }
    Ok(())
}

fn run_decompress(input: PathBuf, output: PathBuf, args: &PipelineArgs) -> anyhow::Result<()> {
    let pipeline = args.pipeline()?;
    let text =
        fs::read_to_string(&input).with_context(|| format!("reading input file {:?}", input))?;

    let mut restored = Vec::new();
    let mut failures = 0usize;
    for item in pipeline.expand_text(&text) {
        match item {
            Ok(record) => restored.push(record),
            Err(err) => {
                warn!(error = %err, "record not restored");
                failures += 1;
            }
        }
    }

    let rendered = render(
        restored.iter().map(|r| (r.name(), r.original())),
        pipeline.config().separator,
    );
    let written = write_atomic(&output, rendered.as_bytes())?;
    let raw: u64 = restored.iter().map(|r| r.original().len() as u64).sum();

    eprintln!("  codec       : {}", pipeline.codec_name());
    eprintln!("  records     : {}", restored.len());
    eprintln!("  raw size    : {}", human_bytes(raw));
    eprintln!("  checksum    : {:016x}", written.digest);
    info!(output = %written.path.display(), "restored artifact written");

    if failures > 0 {
        anyhow::bail!("{} record(s) could not be restored", failures);
    }
    Ok(())
}

fn run_inspect(file: PathBuf) -> anyhow::Result<()> {
    let text =
        fs::read_to_string(&file).with_context(|| format!("reading input file {:?}", file))?;
    let file_size = text.len() as u64;

    println!("=== Artifact: {:?} ===", file);
    println!();
    println!(
        "  {:>6}  {:<24}  {:>12}  {:>16}",
        "line", "record", "size", "checksum"
    );
    println!("  {}", "-".repeat(64));

    let mut records = 0usize;
    let mut total = 0u64;
    let mut malformed = Vec::new();
    for item in RecordParser::new(&text).records() {
        let parsed = match item {
            Ok(parsed) => parsed,
            Err(err) => {
                malformed.push(err);
                continue;
            }
        };
        // Validated by the parser, so decoding cannot fail here.
        let bytes = decode_payload(parsed.payload).unwrap_or_default();
        println!(
            "  {:>6}  {:<24}  {:>12}  {:016x}",
            parsed.line,
            parsed.name,
            human_bytes(bytes.len() as u64),
            xxh3_64(&bytes)
        );
        records += 1;
        total += bytes.len() as u64;
    }

    println!();
    println!("  records        : {}", records);
    println!("  payload bytes  : {}", group_digits(total));
    println!("  file on disk   : {}", human_bytes(file_size));
    if !malformed.is_empty() {
        println!("  malformed      : {}", malformed.len());
        for err in &malformed {
            println!("    {}", err);
        }
    }
    Ok(())
}

fn run_base64(
    data: Option<String>,
    input: Option<PathBuf>,
    name: Option<String>,
    args: &PipelineArgs,
) -> anyhow::Result<()> {
    let (text, default_name) = match &input {
        Some(path) => (
            fs::read_to_string(path).with_context(|| format!("reading input file {:?}", path))?,
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "asset".to_string()),
        ),
        None => (data.unwrap_or_default(), "asset".to_string()),
    };
    let name = name.unwrap_or(default_name);

    let pipeline = args.pipeline()?;
    let outcomes = pipeline.compress_base64(&name, &text);
    let Some(outcome) = outcomes.first() else {
        anyhow::bail!("no record produced");
    };
    if let Some(err) = outcome.failure() {
        anyhow::bail!(err);
    }

    let original = outcome.record().original();
    let compressed = outcome.record().compressed().unwrap_or(original);
    eprintln!("  codec       : {}", pipeline.codec_name());
    eprintln!("  base64      : {} chars", text.trim().len());
    eprintln!("  decoded     : {}", human_bytes(original.len() as u64));
    eprintln!("  compressed  : {}", human_bytes(compressed.len() as u64));
    eprintln!(
        "  savings     : {:.2}%",
        outcome.savings_percent().unwrap_or_default()
    );
    println!("{}: {}", outcome.name(), encode_payload(compressed));
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compress {
            inputs,
            dir,
            json,
            pipeline,
        } => run_compress(inputs, dir, json, &pipeline),
        Commands::Decompress {
            input,
            output,
            pipeline,
        } => run_decompress(input, output, &pipeline),
        Commands::Inspect { file } => run_inspect(file),
        Commands::Base64 {
            data,
            input,
            name,
            pipeline,
        } => run_base64(data, input, name, &pipeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_grouped_by_thousands() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn human_bytes_switches_units() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.00 KB");
    }

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "assetzip",
            "compress",
            "a.txt",
            "--codec",
            "cd",
            "--blank-lines",
            "--verify",
        ]);
        let Commands::Compress { inputs, pipeline, .. } = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(inputs, vec![PathBuf::from("a.txt")]);
        let config = pipeline.load().unwrap();
        assert_eq!(config.mode, CodecMode::Calldata);
        assert_eq!(config.separator, Separator::Blank);
        assert!(config.verify_roundtrip);
        assert_eq!(config.suffix, "_compressed");
    }

    #[test]
    fn unknown_codec_is_rejected() {
        let cli = Cli::parse_from(["assetzip", "inspect", "x.txt"]);
        assert!(matches!(cli.command, Commands::Inspect { .. }));

        let cli = Cli::parse_from(["assetzip", "base64", "3q2+7w==", "--codec", "brotli"]);
        let Commands::Base64 { pipeline, .. } = cli.command else {
            panic!("expected base64");
        };
        assert!(pipeline.load().is_err());
    }
}
