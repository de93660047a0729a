//! Rubric grader for student static-website submissions.
//!
//! Each submission is a zip archive of HTML, CSS, and image files. The
//! grader checks it against a fixed course rubric and produces a
//! deterministic text report of everything missing or wrong.
//!
//! # Rubric
//!
//! | Scope | Requirement |
//! |-------|-------------|
//! | Site | at least 4 HTML files, at least 1 image, exactly 1 stylesheet |
//! | Site | two heading levels, an external link, a list, a paragraph (on any page) |
//! | Page | well-formed markup, `<title>`, `<nav>` whose links all resolve |
//! | Page | stylesheet `<link>` names the site's CSS file |
//! | Page | every `<img>` exists in the site and has `alt` text |
//! | Stylesheet | parses cleanly; `serif` and `sans-serif` each used somewhere |
//! | Stylesheet | `body` (or `html`) sets a margin or padding, and a background |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use site_grader::{Grader, Rubric};
//!
//! let grader = Grader::new(Rubric::default());
//! let report = grader.grade_batch(Path::new("submissions")).expect("batch directory");
//! print!("{}", report.render());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod evidence;
pub mod inventory;
pub mod markup;
pub mod report;
pub mod site;
pub mod stylesheet;
pub mod submission;
pub mod validators;

pub use config::Rubric;
pub use error::GradeError;
pub use report::{BatchReport, Finding, Scope, Section, Severity, SiteReport};
pub use site::Grader;
pub use submission::Submission;
