//! File access behind a trait, so the pipeline can run against the real
//! filesystem or an in-memory store for deterministic tests.

mod local;
mod memory;

pub use local::LocalFileProcessor;
pub use memory::MemoryFileProcessor;

use std::fmt;
use std::path::{Path, PathBuf};

/// Reads, writes, and discovers files for the pipeline.
pub trait FileProcessor: Send + Sync {
    /// Reads the file at `path`.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileError>;

    /// Writes `data` to `path`, creating missing parent directories.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileError>;

    /// Returns every path matching any of the glob patterns.
    fn find_files(&self, globs: &[String]) -> Result<Vec<PathBuf>, FileError>;

    /// Returns the directory portion of `path`; `.` for bare file names.
    fn path_to_file(&self, path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Errors raised by file processors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// The specific error that occurred
    pub kind: FileErrorKind,
}

/// Specific file error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileErrorKind {
    /// The file does not exist
    NotFound {
        /// The missing path
        path: PathBuf,
    },
    /// Reading a file failed
    Read {
        /// The path that failed to read
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
    /// Writing a file failed
    Write {
        /// The path that failed to write
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
    /// A glob pattern failed to parse
    Pattern {
        /// The offending pattern
        pattern: String,
        /// The underlying reason
        reason: String,
    },
}

impl FileError {
    /// Creates a new FileError with the given kind.
    #[must_use]
    pub fn new(kind: FileErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(FileErrorKind::NotFound { path: path.into() })
    }

    /// Creates a read failure error.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(FileErrorKind::Read {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a write failure error.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(FileErrorKind::Write {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a bad-pattern error.
    #[must_use]
    pub fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(FileErrorKind::Pattern {
            pattern: pattern.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if this error reports a missing file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, FileErrorKind::NotFound { .. })
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FileErrorKind::NotFound { path } => {
                write!(f, "file not found: {}", path.display())
            }
            FileErrorKind::Read { path, reason } => {
                write!(f, "failed to read '{}': {}", path.display(), reason)
            }
            FileErrorKind::Write { path, reason } => {
                write!(
                    f,
                    "failed to write '{}': {}; check permissions and the output root",
                    path.display(),
                    reason
                )
            }
            FileErrorKind::Pattern { pattern, reason } => {
                write!(f, "invalid glob pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for FileError {}
