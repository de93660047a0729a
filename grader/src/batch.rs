//! Batch grading: every submission archive in a directory, in sorted order.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::report::{BatchReport, Finding, Scope, Section, SiteReport};
use crate::site::Grader;
use crate::submission::Submission;

/// The gradeable contents of a batch directory.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchInput {
    /// Archive paths in sorted order.
    pub archives: Vec<PathBuf>,
    /// Operator diagnostics for entries that are not archives.
    pub diagnostics: Vec<String>,
}

/// Lists the archives directly inside `dir`.
///
/// Subdirectories, hidden files, and previous reports (`report_file_name`
/// and its `.json` counterpart) are skipped silently; other non-zip files
/// produce a diagnostic.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory or cannot be listed.
pub fn scan_batch_dir(dir: &Path, report_file_name: &str) -> Result<BatchInput> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let json_report = Path::new(report_file_name).with_extension("json");
    let previous_reports = [Path::new(report_file_name), json_report.as_path()];
    let mut input = BatchInput::default();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Cannot list {}", dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        let is_report = previous_reports
            .iter()
            .any(|report| report.as_os_str() == entry.file_name());
        if name.starts_with('.') || is_report {
            continue;
        }
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            input.archives.push(path.to_path_buf());
        } else {
            warn!(file = %path.display(), "not a zip file");
            input
                .diagnostics
                .push(format!("File {} is not a zip file; please assess.", path.display()));
        }
    }

    input.archives.sort();
    input.diagnostics.sort();
    Ok(input)
}

impl Grader {
    /// Grades every archive in `dir`.
    ///
    /// Archives are reported by path relative to `dir`. An archive that cannot
    /// be read gets a one-line report of its own; the batch continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if `dir` cannot be listed.
    pub fn grade_batch(&self, dir: &Path) -> Result<BatchReport> {
        let input = scan_batch_dir(dir, &self.rubric().report_file_name)?;
        info!(
            archives = input.archives.len(),
            skipped = input.diagnostics.len(),
            "batch scanned"
        );

        let mut report = BatchReport::new();
        report.diagnostics = input.diagnostics;
        for path in &input.archives {
            let id = path.strip_prefix(dir).unwrap_or(path).display().to_string();
            let site = match Submission::read_zip(path, id.clone()) {
                Ok(submission) => self.grade_site(&submission),
                Err(e) => {
                    warn!(archive = %id, error = %e, "archive unreadable");
                    unreadable(id, &e.to_string())
                }
            };
            report.push(site);
        }
        Ok(report)
    }

    /// Grades in-memory submissions, ordered by id.
    pub fn grade_submissions(&self, submissions: impl IntoIterator<Item = Submission>) -> BatchReport {
        let mut submissions: Vec<Submission> = submissions.into_iter().collect();
        submissions.sort_by(|a, b| a.id.cmp(&b.id));
        let mut report = BatchReport::new();
        for submission in &submissions {
            report.push(self.grade_site(submission));
        }
        report
    }
}

fn unreadable(id: String, error: &str) -> SiteReport {
    let mut site = SiteReport::new(id);
    site.push(Section::new(
        Scope::Site,
        vec![Finding::review(
            "site/archive",
            format!("Archive could not be read: {}", error),
        )],
    ));
    site
}
