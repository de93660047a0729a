//! Whole-site evidence gathered across HTML files.
//!
//! Some rubric items are satisfied by the site rather than by any one page:
//! two heading levels may live in different files. Each page check returns
//! an [`Evidence`] delta; the site grader owns one running value and merges
//! every delta into it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::report::Finding;

/// An HTML heading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<h3>`
    H3,
    /// `<h4>`
    H4,
    /// `<h5>`
    H5,
    /// `<h6>`
    H6,
}

impl HeadingLevel {
    /// All levels, outermost first.
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Lower-case tag name.
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

/// Monotonic accumulator of cross-file rubric evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evidence {
    /// Some `<a>` links off-site.
    pub external_link_seen: bool,
    /// Some `<ul>` or `<ol>` exists.
    pub list_seen: bool,
    /// Some `<p>` exists.
    pub paragraph_seen: bool,
    /// Heading tags present anywhere.
    pub heading_levels_seen: BTreeSet<HeadingLevel>,
}

impl Evidence {
    /// Folds a per-file delta in. Never retracts anything already seen.
    pub fn merge(&mut self, delta: &Evidence) {
        self.external_link_seen |= delta.external_link_seen;
        self.list_seen |= delta.list_seen;
        self.paragraph_seen |= delta.paragraph_seen;
        self.heading_levels_seen
            .extend(delta.heading_levels_seen.iter().copied());
    }

    /// Whole-site findings for whatever is still missing.
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        if self.heading_levels_seen.len() < 2 {
            findings.push(Finding::fail(
                "site/headings",
                "Site does not have two levels of heading tags.",
            ));
        }
        if !self.external_link_seen {
            findings.push(Finding::fail(
                "site/external-link",
                "No external links anywhere in site.",
            ));
        }
        if !self.list_seen {
            findings.push(Finding::fail("site/list", "No list anywhere in site."));
        }
        if !self.paragraph_seen {
            findings.push(Finding::fail("site/paragraph", "No paragraph anywhere in site."));
        }
        findings
    }
}
