//! A student's submission: the raw files of one archive.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::error::GradeError;

// Header sizes are untrusted; larger entries grow the buffer as they are read.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// One file from a submission archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path inside the archive, `/`-separated.
    pub path: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// The files of one submission, in archive listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Identifying path shown in the report.
    pub id: String,
    /// File entries; directory entries are not included.
    pub entries: Vec<Entry>,
}

impl Submission {
    /// Builds a submission from `(path, bytes)` pairs.
    pub fn from_entries<I, P, B>(id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: Into<Vec<u8>>,
    {
        Self {
            id: id.into(),
            entries: entries
                .into_iter()
                .map(|(path, bytes)| Entry {
                    path: path.into(),
                    bytes: bytes.into(),
                })
                .collect(),
        }
    }

    /// Reads every file entry of a zip archive.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::Io`] if the archive cannot be opened and
    /// [`GradeError::Archive`] if it is not a readable zip file.
    pub fn read_zip(path: &Path, id: impl Into<String>) -> Result<Self, GradeError> {
        let io_error = |source| GradeError::Io {
            path: path.to_path_buf(),
            source,
        };
        let zip_error = |source| GradeError::Archive {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let mut archive = ZipArchive::new(file).map_err(zip_error)?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(zip_error)?;
            if file.is_dir() {
                continue;
            }
            let capacity = usize::try_from(file.size().min(MAX_PREALLOCATION)).unwrap_or(0);
            let mut bytes = Vec::with_capacity(capacity);
            file.read_to_end(&mut bytes).map_err(io_error)?;
            entries.push(Entry {
                path: file.name().to_string(),
                bytes,
            });
        }

        Ok(Self {
            id: id.into(),
            entries,
        })
    }

    /// Entry paths in listing order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Contents of the first entry at `path`.
    pub fn bytes(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.bytes.as_slice())
    }
}
