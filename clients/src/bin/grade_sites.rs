//! `grade-sites` — Grades a directory of student website submissions.
//!
//! Every `.zip` archive directly inside the batch directory is graded
//! against the course rubric. One report covering all archives, in sorted
//! order, is written into the batch directory (or to `--out`).
//!
//! **Usage:**
//! ```text
//! grade-sites [--dir <path>] [--out <path>] [--format text|json]
//!             [--rubric <file.toml>] [--tidy <program>] [--log-json]
//! ```
//!
//! Set `RUST_LOG=debug` for per-file progress.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use site_grader::markup::TidyValidator;
use site_grader::{Grader, Rubric};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Plain text, one section per archive.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Grade student website submissions against the course rubric.
#[derive(Parser)]
#[command(
    name = "grade-sites",
    about = "Grade a directory of zipped student websites"
)]
struct Args {
    /// Directory containing the zip files to grade (default: current directory).
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Report path (default: the rubric's report file inside --dir).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// TOML file overriding rubric thresholds.
    #[arg(long)]
    rubric: Option<PathBuf>,

    /// Validate markup with this HTML Tidy executable instead of html5ever.
    #[arg(long)]
    tidy: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let rubric = match &args.rubric {
        Some(path) => Rubric::load(path)?,
        None => Rubric::default(),
    };
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_report_path(&args.dir, &rubric, args.format));

    let mut grader = Grader::new(rubric);
    if let Some(program) = &args.tidy {
        grader = grader.with_markup_validator(TidyValidator::new(program.clone()));
    }

    let report = grader.grade_batch(&args.dir)?;

    for diagnostic in &report.diagnostics {
        println!("\t{}", diagnostic);
    }

    let content = match args.format {
        Format::Text => report.render(),
        Format::Json => report.to_json().context("Cannot serialize report")?,
    };
    write(&out, &content)?;

    println!(
        "Graded {} archive(s): {} all good, {} with findings.",
        report.sites.len(),
        report.clean_count(),
        report.sites.len() - report.clean_count()
    );
    println!("  Report: {}", out.display());
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn default_report_path(dir: &Path, rubric: &Rubric, format: Format) -> PathBuf {
    let path = dir.join(&rubric.report_file_name);
    match format {
        Format::Text => path,
        Format::Json => path.with_extension("json"),
    }
}

/// Writes the report, creating parent directories as needed.
fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Cannot write file: {}", path.display()))?;
    Ok(())
}
