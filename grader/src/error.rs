//! Error type for failures that stay local to one archive or one file.

use std::path::PathBuf;

use thiserror::Error;

/// A recoverable failure raised while grading.
///
/// None of these abort a batch: the grader turns each one into a finding
/// scoped to the archive or file that raised it.
#[derive(Debug, Error)]
pub enum GradeError {
    /// The archive could not be opened or one of its entries could not be read.
    #[error("cannot read archive {}: {source}", path.display())]
    Archive {
        /// Path of the archive.
        path: PathBuf,
        /// Underlying zip failure.
        #[source]
        source: zip::result::ZipError,
    },

    /// A file-system operation failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A stylesheet is not valid UTF-8 text.
    #[error("stylesheet is not valid UTF-8 (first bad byte at offset {offset})")]
    CssDecode {
        /// Byte offset of the first invalid sequence.
        offset: usize,
    },

    /// The external markup validator could not be launched or talked to.
    #[error("markup validator `{program}` failed: {source}")]
    Validator {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A rubric file is not valid TOML for [`crate::config::Rubric`].
    #[error("invalid rubric file {}: {source}", path.display())]
    Rubric {
        /// Path of the rubric file.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
}
