//! Site grading: runs every check over one submission and assembles its report.
//!
//! Report sections always come in this order:
//! 1. file counts
//! 2. one section per HTML file, in archive listing order
//! 3. whole-site evidence (headings, external link, list, paragraph)
//! 4. one section per CSS file

use tracing::{debug, info, warn};

use crate::config::Rubric;
use crate::document::Document;
use crate::error::GradeError;
use crate::evidence::Evidence;
use crate::inventory::SiteInventory;
use crate::markup::{normalize, Html5everValidator, MarkupValidator};
use crate::report::{Finding, Scope, Section, SiteReport};
use crate::stylesheet::{CssParserBackend, StylesheetParser};
use crate::submission::Submission;
use crate::validators::{css, html};

/// Grades submissions against a [`Rubric`] using pluggable parsing collaborators.
pub struct Grader {
    rubric: Rubric,
    markup: Box<dyn MarkupValidator>,
    styles: Box<dyn StylesheetParser>,
}

impl Default for Grader {
    fn default() -> Self {
        Self::new(Rubric::default())
    }
}

impl Grader {
    /// Creates a grader with the in-process html5ever and cssparser collaborators.
    pub fn new(rubric: Rubric) -> Self {
        Self {
            rubric,
            markup: Box::new(Html5everValidator),
            styles: Box::new(CssParserBackend),
        }
    }

    /// Replaces the markup validator.
    pub fn with_markup_validator(mut self, validator: impl MarkupValidator + 'static) -> Self {
        self.markup = Box::new(validator);
        self
    }

    /// Replaces the stylesheet parser.
    pub fn with_stylesheet_parser(mut self, parser: impl StylesheetParser + 'static) -> Self {
        self.styles = Box::new(parser);
        self
    }

    /// The rubric in use.
    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Grades one submission.
    pub fn grade_site(&self, submission: &Submission) -> SiteReport {
        let inventory = SiteInventory::from_paths(submission.paths());
        let mut report = SiteReport::new(submission.id.clone());

        report.push(Section::new(Scope::Site, self.count_files(&inventory)));

        let mut evidence = Evidence::default();
        for path in &inventory.html_files {
            let Some(source) = submission.bytes(path) else {
                continue;
            };
            debug!(file = %path, "checking HTML");
            let (findings, delta) = self.check_html_file(source, &inventory);
            evidence.merge(&delta);
            report.push(Section::new(Scope::Html(path.clone()), findings));
        }
        report.push(Section::new(Scope::Site, evidence.findings()));

        for path in &inventory.css_files {
            let Some(source) = submission.bytes(path) else {
                continue;
            };
            debug!(file = %path, "checking CSS");
            report.push(Section::new(
                Scope::Css(path.clone()),
                self.check_css_file(path, source),
            ));
        }

        info!(
            archive = %submission.id,
            findings = report.findings().count(),
            "graded"
        );
        report
    }

    fn count_files(&self, inventory: &SiteInventory) -> Vec<Finding> {
        let mut findings = Vec::new();

        let html = inventory.html_files.len();
        if html < self.rubric.min_html_files {
            findings.push(Finding::fail("site/files", format!("Only {} HTML files.", html)));
        }

        let images = inventory.image_files.len();
        if images == 0 && self.rubric.min_image_files > 0 {
            findings.push(Finding::fail("site/files", "Does not have an image file."));
        } else if images < self.rubric.min_image_files {
            findings.push(Finding::fail(
                "site/files",
                format!("Only {} image files.", images),
            ));
        }

        match inventory.css_files.len() {
            0 => findings.push(Finding::fail("site/files", "Does not have a CSS file.")),
            1 => {}
            _ => findings.push(Finding::review(
                "site/files",
                "Contains more than one CSS file; investigate manually.",
            )),
        }

        findings
    }

    fn check_html_file(&self, source: &[u8], inventory: &SiteInventory) -> (Vec<Finding>, Evidence) {
        let mut findings: Vec<Finding> = match self.markup.validate(source) {
            Ok(lines) => normalize(&lines)
                .into_iter()
                .map(|line| Finding::fail("html/markup", line))
                .collect(),
            Err(e) => {
                warn!(error = %e, "markup validator failed");
                vec![Finding::review(
                    "html/markup",
                    format!("Markup validator could not run: {}", e),
                )]
            }
        };

        let page = html::check_page(&Document::parse(source), inventory);
        findings.extend(page.findings);
        (findings, page.evidence)
    }

    fn check_css_file(&self, path: &str, source: &[u8]) -> Vec<Finding> {
        match self.styles.parse(source) {
            Ok(sheet) => css::check_stylesheet(&sheet),
            Err(e @ GradeError::CssDecode { .. }) => {
                warn!(file = %path, error = %e, "stylesheet skipped");
                vec![css::undecodable()]
            }
            Err(e) => {
                warn!(file = %path, error = %e, "stylesheet skipped");
                vec![Finding::review(
                    "css/parse",
                    format!("Stylesheet could not be parsed: {}", e),
                )]
            }
        }
    }
}
