//! Error types for pre-flight storage checks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing a destination directory.
///
/// Each variant aborts exactly one task; sibling tasks in the same batch
/// are unaffected.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The destination path exists but is not a directory.
    #[error("destination {path} exists but is not a directory")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The filesystem backing the destination has less free space than the
    /// expected file size.
    #[error("not enough space on {path}: need {needed} bytes, {available} available")]
    InsufficientSpace {
        /// Destination directory that was checked.
        path: PathBuf,
        /// Expected file size in bytes.
        needed: u64,
        /// Free space reported by the filesystem.
        available: u64,
    },

    /// Creating the destination directory tree failed.
    #[error("could not create directory {path}: {source}")]
    Create {
        /// Directory that failed to create.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Querying free space failed.
    #[error("could not query free space for {path}: {source}")]
    SpaceQuery {
        /// Directory whose filesystem was queried.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Creates a not-a-directory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Creates an insufficient-space error.
    pub fn insufficient_space(path: impl Into<PathBuf>, needed: u64, available: u64) -> Self {
        Self::InsufficientSpace {
            path: path.into(),
            needed,
            available,
        }
    }

    /// Creates a directory-creation error.
    pub fn create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Create {
            path: path.into(),
            source,
        }
    }

    /// Creates a free-space query error.
    pub fn space_query(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SpaceQuery {
            path: path.into(),
            source,
        }
    }
}
