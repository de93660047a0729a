//! Rubric thresholds and report naming.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! yields the standard course rubric:
//!
//! ```toml
//! min_html_files = 4
//! min_image_files = 1
//! report_file_name = "Grading_Results.txt"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Default report file name, also skipped when scanning a batch directory.
pub const DEFAULT_REPORT_FILE: &str = "Grading_Results.txt";

/// Tunable rubric thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rubric {
    /// A site with fewer HTML files than this is flagged.
    pub min_html_files: usize,
    /// A site with fewer image files than this is flagged.
    pub min_image_files: usize,
    /// Name of the report written into the batch directory.
    pub report_file_name: String,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            min_html_files: 4,
            min_image_files: 1,
            report_file_name: DEFAULT_REPORT_FILE.to_string(),
        }
    }
}

impl Rubric {
    /// Parses a rubric from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed or names an unknown field.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads a rubric from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::Io`] if the file cannot be read and
    /// [`GradeError::Rubric`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, GradeError> {
        let text = std::fs::read_to_string(path).map_err(|source| GradeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| GradeError::Rubric {
            path: path.to_path_buf(),
            source,
        })
    }
}
