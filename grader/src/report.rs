//! Report types: findings, per-site reports, and the batch report.

use serde::Serialize;

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A rubric item is missing or wrong.
    Failure,
    /// The grader cannot decide; a human should look.
    Review,
}

/// A single reportable rubric violation or informational note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Short identifier of the check that produced this finding.
    pub check: String,
    /// Report line, without indentation.
    pub message: String,
    /// Severity of the finding.
    pub severity: Severity,
}

impl Finding {
    /// Creates a failure finding.
    pub fn fail(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            message: message.into(),
            severity: Severity::Failure,
        }
    }

    /// Creates a finding that asks for manual review.
    pub fn review(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            message: message.into(),
            severity: Severity::Review,
        }
    }

    /// Returns true if this finding is a failure.
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

/// What a group of findings is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Scope {
    /// The submission as a whole.
    Site,
    /// One HTML file, by archive path.
    Html(String),
    /// One CSS file, by archive path.
    Css(String),
}

/// Findings sharing one scope, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Scope of every finding in this section.
    pub scope: Scope,
    /// Findings in first-encountered order.
    pub findings: Vec<Finding>,
}

impl Section {
    /// Creates a section.
    pub fn new(scope: Scope, findings: Vec<Finding>) -> Self {
        Self { scope, findings }
    }

    /// Heading line printed above file-scoped findings.
    pub fn heading(&self) -> Option<String> {
        match &self.scope {
            Scope::Site => None,
            Scope::Html(path) => Some(format!("{} HTML errors:", path)),
            Scope::Css(path) => Some(format!("{} CSS errors:", path)),
        }
    }
}

/// Every finding for one submission archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    /// Identifying path of the archive.
    pub archive: String,
    /// Non-empty sections in report order.
    pub sections: Vec<Section>,
}

impl SiteReport {
    /// Creates an empty report for `archive`.
    pub fn new(archive: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            sections: Vec::new(),
        }
    }

    /// Appends a section; empty sections are dropped.
    pub fn push(&mut self, section: Section) {
        if !section.findings.is_empty() {
            self.sections.push(section);
        }
    }

    /// Iterates over all findings in report order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.sections.iter().flat_map(|s| s.findings.iter())
    }

    /// Returns true if the submission produced no findings at all.
    pub fn is_clean(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the count of failures, excluding manual-review notes.
    pub fn failure_count(&self) -> usize {
        self.findings().filter(|f| f.is_failure()).count()
    }

    /// Renders this site as report text (no trailing newline).
    pub fn render(&self) -> String {
        if self.is_clean() {
            return format!("{} all good.", self.archive);
        }
        let mut out = format!("File: {}", self.archive);
        for section in &self.sections {
            if let Some(heading) = section.heading() {
                out.push_str("\n\t");
                out.push_str(&heading);
            }
            for finding in &section.findings {
                out.push_str("\n\t");
                out.push_str(&finding.message);
            }
        }
        out
    }
}

/// Aggregated report across a batch of submissions.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Site reports in sorted archive order.
    pub sites: Vec<SiteReport>,
    /// Operator diagnostics about batch entries that were not graded.
    pub diagnostics: Vec<String>,
}

impl BatchReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a site report.
    pub fn push(&mut self, site: SiteReport) {
        self.sites.push(site);
    }

    /// Returns the number of sites with no findings.
    pub fn clean_count(&self) -> usize {
        self.sites.iter().filter(|s| s.is_clean()).count()
    }

    /// Renders the whole batch as report text, one blank line between sites.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for site in &self.sites {
            out.push_str(&site.render());
            out.push_str("\n\n");
        }
        out
    }

    /// Renders the whole batch as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
