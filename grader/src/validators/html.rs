//! HTML structural checks for one page of a submission.
//!
//! Checks, in report order:
//! - `<title>` present
//! - `<nav>` present, contains links, and every nav link resolves to a page
//!   of the site (by base filename, ignoring case) or points off-site
//! - the first stylesheet `<link>` names the site's CSS file
//! - every `<img>` names an image in the site (or off-site) and has `alt`
//! - `<body>` class/id flagged for manual CSS review
//!
//! The page also contributes [`Evidence`] toward whole-site requirements.

use crate::document::{Document, Element};
use crate::evidence::{Evidence, HeadingLevel};
use crate::inventory::{base_name, SiteInventory};
use crate::report::Finding;

/// Allow-listed font-service stylesheet pattern, e.g. Google Fonts.
const FONT_SERVICE_PATTERN: &str = "css?family";

/// Result of checking one page.
#[derive(Debug, Default)]
pub struct PageCheck {
    /// Findings in check order.
    pub findings: Vec<Finding>,
    /// What this page contributes toward whole-site requirements.
    pub evidence: Evidence,
}

/// Checks one parsed page against the site's file inventory.
pub fn check_page(doc: &Document, site: &SiteInventory) -> PageCheck {
    let mut findings = Vec::new();

    if !doc.contains("title") {
        findings.push(Finding::fail("html/title", "No <title> element."));
    }
    check_nav(doc, site, &mut findings);
    check_stylesheet_link(doc, site, &mut findings);
    check_images(doc, site, &mut findings);
    check_body_selectors(doc, &mut findings);

    PageCheck {
        findings,
        evidence: gather_evidence(doc),
    }
}

/// Absolute off-site reference, which is never checked for existence.
fn is_external(target: &str) -> bool {
    target
        .get(..4)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
}

fn check_nav(doc: &Document, site: &SiteInventory, findings: &mut Vec<Finding>) {
    if !doc.contains("nav") {
        findings.push(Finding::fail("html/nav", "No <nav> element."));
        return;
    }

    let links = doc.select("nav a");
    if links.is_empty() {
        findings.push(Finding::fail("html/nav", "<nav> element contains no links."));
        return;
    }

    for link in &links {
        let Some(href) = link.attr("href") else {
            findings.push(Finding::fail(
                "html/nav-link",
                format!("Problematic nav link: {}", link.describe()),
            ));
            continue;
        };
        let target = href.to_lowercase();
        if !is_external(&target) && !site.has_html_named(base_name(&target)) {
            findings.push(Finding::fail(
                "html/nav-link",
                format!("Broken nav link: {}", href),
            ));
        }
    }
}

fn check_stylesheet_link(doc: &Document, site: &SiteInventory, findings: &mut Vec<Finding>) {
    if site.css_files.is_empty() {
        return;
    }

    let Some(link) = first_stylesheet_link(doc) else {
        findings.push(Finding::fail("html/css-link", "No <link> to CSS."));
        return;
    };
    let Some(href) = link.attr("href") else {
        findings.push(Finding::fail(
            "html/css-link",
            format!("CSS <link> has no href: {}", link.describe()),
        ));
        return;
    };

    let linked = base_name(&href);
    for css_file in &site.css_files {
        let expected = base_name(css_file);
        if linked != expected && !linked.contains(FONT_SERVICE_PATTERN) {
            findings.push(Finding::fail(
                "html/css-link",
                format!("CSS <link> doesn't work: {} {}", href, expected),
            ));
        }
    }
}

// Prefers a link declared as a stylesheet; falls back to the first <link>.
fn first_stylesheet_link(doc: &Document) -> Option<Element> {
    let links = doc.select("link");
    let stylesheet = links.iter().find(|link| {
        link.attr("rel").is_some_and(|rel| {
            rel.split_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
    });
    stylesheet.or(links.first()).cloned()
}

fn check_images(doc: &Document, site: &SiteInventory, findings: &mut Vec<Finding>) {
    for image in doc.select("img") {
        match image.attr("src") {
            None => findings.push(Finding::fail(
                "html/img-src",
                format!("Image has no src attribute: {}", image.describe()),
            )),
            Some(src) => {
                let name = src.to_lowercase();
                if !is_external(&src) && !site.has_image_named(base_name(&name)) {
                    findings.push(Finding::fail(
                        "html/img-src",
                        format!("Image file {} called but appears not to exist.", src),
                    ));
                }
            }
        }
        if !image.has_attr("alt") {
            findings.push(Finding::fail(
                "html/img-alt",
                format!("No alt text: {}", image.describe()),
            ));
        }
    }
}

// The CSS checker only recognizes a bare `body` selector, so a styled
// class or id on <body> needs a human to read the stylesheet.
fn check_body_selectors(doc: &Document, findings: &mut Vec<Finding>) {
    let Some(body) = doc.first("body") else {
        return;
    };
    if let Some(class) = body.attr("class") {
        findings.push(Finding::review(
            "html/body-selector",
            format!("<body> has class {}; check CSS manually.", class),
        ));
    }
    if let Some(id) = body.attr("id") {
        findings.push(Finding::review(
            "html/body-selector",
            format!("<body> has id {}; check CSS manually.", id),
        ));
    }
}

fn gather_evidence(doc: &Document) -> Evidence {
    Evidence {
        external_link_seen: doc
            .select("a")
            .iter()
            .filter_map(|a| a.attr("href"))
            .any(|href| is_external(&href)),
        list_seen: doc.contains("ul") || doc.contains("ol"),
        paragraph_seen: doc.contains("p"),
        heading_levels_seen: HeadingLevel::ALL
            .into_iter()
            .filter(|level| doc.contains(level.tag()))
            .collect(),
    }
}
