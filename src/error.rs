use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures surfaced by the archive metadata engine.
///
/// Every variant is per-file: batch callers report it and move on to the next
/// archive.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a valid CBZ archive: {}: {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("failed to parse ComicInfo.xml in {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("I/O failure on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, TagError>;

impl TagError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            TagError::NotFound(path.to_path_buf())
        } else {
            TagError::IoFailure {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Like [`TagError::io`] but never reports `NotFound`, for paths the
    /// engine creates itself.
    pub fn io_failure(path: &Path, source: std::io::Error) -> Self {
        TagError::IoFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn corrupt(path: &Path, reason: impl ToString) -> Self {
        TagError::CorruptArchive {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(path: &Path, reason: impl ToString) -> Self {
        TagError::ParseError {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
