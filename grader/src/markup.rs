//! Markup validation collaborators.
//!
//! A validator takes raw page bytes and returns line-oriented diagnostics.
//! The grader normalizes whitespace in those lines before they become
//! findings, so validators may return whatever their tool prints.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::document::Document;
use crate::error::GradeError;

/// Something that can check HTML well-formedness.
pub trait MarkupValidator {
    /// Returns the validator's diagnostics for one page.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::Validator`] if the validator could not run at all.
    fn validate(&self, source: &[u8]) -> Result<Vec<String>, GradeError>;
}

/// In-process validator reporting html5ever's parse errors, each prefixed
/// with `line N - `.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html5everValidator;

impl MarkupValidator for Html5everValidator {
    fn validate(&self, source: &[u8]) -> Result<Vec<String>, GradeError> {
        Ok(Document::parse(source).parse_errors())
    }
}

/// Runs an external HTML Tidy executable as `<program> -quiet -errors` and
/// reads its diagnostics from stderr.
#[derive(Debug, Clone)]
pub struct TidyValidator {
    program: String,
}

impl TidyValidator {
    /// Creates a validator invoking `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MarkupValidator for TidyValidator {
    fn validate(&self, source: &[u8]) -> Result<Vec<String>, GradeError> {
        let failed = |source| GradeError::Validator {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(["-quiet", "-errors"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(failed)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source).map_err(failed)?;
        }
        // Tidy exits 1 for warnings and 2 for errors; both still mean it ran.
        let output = child.wait_with_output().map_err(failed)?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(stderr.lines().map(str::to_string).collect())
    }
}

/// Splits validator output into report lines, collapsing whitespace runs and
/// dropping blank lines.
pub fn normalize(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|chunk| chunk.lines())
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_tabs_and_drops_blanks() {
        let raw = vec![
            "line 1 column 1\t-  Warning:\tmissing <!DOCTYPE>  ".to_string(),
            "   ".to_string(),
            "line 4 column 2 - Error: <blink> is not recognized!\n\nsecond".to_string(),
        ];
        assert_eq!(
            normalize(&raw),
            vec![
                "line 1 column 1 - Warning: missing <!DOCTYPE>",
                "line 4 column 2 - Error: <blink> is not recognized!",
                "second",
            ]
        );
    }

    #[test]
    fn html5ever_validator_accepts_valid_page() {
        let page = b"<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>";
        let errors = Html5everValidator.validate(page).unwrap_or_default();
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn html5ever_validator_reports_missing_doctype() {
        let errors = Html5everValidator
            .validate(b"<html><body></body></html>")
            .unwrap_or_default();
        assert!(errors.first().is_some_and(|e| e.starts_with("line 1 - ")), "{:?}", errors);
    }

    #[test]
    fn missing_tidy_is_an_error_not_a_panic() {
        let tidy = TidyValidator::new("definitely-not-an-installed-tidy-binary");
        let result = tidy.validate(b"<p>x</p>");
        assert!(
            matches!(&result, Err(GradeError::Validator { program, .. }) if program == "definitely-not-an-installed-tidy-binary"),
            "expected validator error, got {:?}",
            result
        );
    }
}
