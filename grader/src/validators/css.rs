//! CSS property checks for one stylesheet.
//!
//! - every recovered syntax error, with its line
//! - some declared value is `serif`, and some is `sans-serif`
//! - a bare `body` or `html` rule sets a margin or padding property
//! - a bare `body` or `html` rule sets a background property
//!
//! Only top-level style rules are examined. Body rules written with a class
//! or id selector are not recognized; the HTML checks flag those pages for
//! manual review instead.

use std::collections::BTreeSet;

use crate::report::Finding;
use crate::stylesheet::StyleSheet;

const PAGE_SELECTORS: &[&str] = &["body", "html"];
const SPACING_PREFIXES: &[&str] = &["margin", "padding"];
const BACKGROUND_PREFIX: &str = "background";

/// Checks one parsed stylesheet.
pub fn check_stylesheet(sheet: &StyleSheet) -> Vec<Finding> {
    let mut findings: Vec<Finding> = sheet
        .errors
        .iter()
        .map(|e| Finding::fail("css/syntax", format!("Line {}: {}", e.line, e.message)))
        .collect();

    let values: BTreeSet<String> = sheet
        .style_rules()
        .flat_map(|rule| rule.declarations.iter())
        .flat_map(|decl| decl.terms())
        .collect();
    for family in ["serif", "sans-serif"] {
        if !values.contains(family) {
            findings.push(Finding::fail(
                "css/font",
                format!("No font set to {} anywhere.", family),
            ));
        }
    }

    let page_properties: Vec<&str> = sheet
        .style_rules()
        .filter(|rule| PAGE_SELECTORS.iter().any(|tag| rule.has_type_selector(tag)))
        .flat_map(|rule| rule.declarations.iter())
        .map(|decl| decl.name.as_str())
        .collect();
    let sets = |prefix: &str| page_properties.iter().any(|name| name.starts_with(prefix));

    if !SPACING_PREFIXES.iter().any(|&prefix| sets(prefix)) {
        findings.push(Finding::fail("css/margin", "No margin on <body>."));
    }
    if !sets(BACKGROUND_PREFIX) {
        findings.push(Finding::fail("css/background", "Background color not changed."));
    }

    findings
}

/// Finding for a stylesheet whose bytes are not text.
pub fn undecodable() -> Finding {
    Finding::review(
        "css/decode",
        "CSS file has a non-Unicode character in it, causing the checker to break; check manually.",
    )
}
