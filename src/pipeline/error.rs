//! Error types for the execution pipeline.

use std::fmt;
use std::path::PathBuf;

/// Errors that abort or curtail a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    /// The specific error that occurred
    pub kind: PipelineErrorKind,
}

/// Specific pipeline error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// Reading a script failed; production stops, in-flight jobs finish
    Read {
        /// The script that failed to read
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
    /// A worker failed to construct its sandbox
    Sandbox {
        /// The underlying reason
        reason: String,
    },
    /// Executing or converting a script failed; fatal to the whole run
    Execution {
        /// The script that failed
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
    /// Serializing a result failed; fatal to the whole run
    Serialize {
        /// The script whose result failed to serialize
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
    /// Persisting an output failed; fatal to the whole run
    Write {
        /// The output path that failed to write
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
}

impl PipelineError {
    /// Creates a new PipelineError with the given kind.
    #[must_use]
    pub fn new(kind: PipelineErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a read failure error.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::Read {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a sandbox construction error.
    #[must_use]
    pub fn sandbox(reason: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::Sandbox {
            reason: reason.into(),
        })
    }

    /// Creates an execution failure error.
    #[must_use]
    pub fn execution(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::Execution {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a serialization failure error.
    #[must_use]
    pub fn serialize(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::Serialize {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a write failure error.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::Write {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if this error came from script execution.
    #[must_use]
    pub fn is_execution(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Execution { .. })
    }

    /// Returns true if this error came from reading a script.
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Read { .. })
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PipelineErrorKind::Read { path, reason } => {
                write!(
                    f,
                    "failed to read script '{}': {}; no further jobs will be produced",
                    path.display(),
                    reason
                )
            }
            PipelineErrorKind::Sandbox { reason } => {
                write!(f, "failed to construct worker sandbox: {}", reason)
            }
            PipelineErrorKind::Execution { path, reason } => {
                write!(f, "script '{}' failed: {}", path.display(), reason)
            }
            PipelineErrorKind::Serialize { path, reason } => {
                write!(
                    f,
                    "failed to serialize output for '{}': {}",
                    path.display(),
                    reason
                )
            }
            PipelineErrorKind::Write { path, reason } => {
                write!(f, "failed to write '{}': {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for PipelineError {}
