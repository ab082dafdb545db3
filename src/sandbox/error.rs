//! Error types for sandboxed script execution.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while constructing or using a sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxError {
    /// The specific error that occurred
    pub kind: SandboxErrorKind,
}

/// Specific sandbox error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxErrorKind {
    /// Sandbox construction failed before any user script ran
    Init {
        /// Reason for the failure
        reason: String,
    },
    /// A script raised an error during execution
    Script {
        /// Error text reported by the interpreter
        reason: String,
    },
    /// A module reference used a relative path
    RelativeImport {
        /// The offending module reference
        module: String,
    },
    /// The script's resolved return value was not a sequence or mapping
    InvalidReturnValue {
        /// The interpreter type name of the resolved value
        actual: String,
    },
    /// A search path directory does not exist
    PathNotFound {
        /// The directory that could not be registered
        path: PathBuf,
    },
}

impl SandboxError {
    /// Creates a new SandboxError with the given kind.
    #[must_use]
    pub fn new(kind: SandboxErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an initialization error.
    #[must_use]
    pub fn init(reason: impl Into<String>) -> Self {
        Self::new(SandboxErrorKind::Init {
            reason: reason.into(),
        })
    }

    /// Creates a script execution error.
    #[must_use]
    pub fn script(reason: impl Into<String>) -> Self {
        Self::new(SandboxErrorKind::Script {
            reason: reason.into(),
        })
    }

    /// Creates a relative import rejection error.
    #[must_use]
    pub fn relative_import(module: impl Into<String>) -> Self {
        Self::new(SandboxErrorKind::RelativeImport {
            module: module.into(),
        })
    }

    /// Creates an invalid return value error.
    #[must_use]
    pub fn invalid_return_value(actual: impl Into<String>) -> Self {
        Self::new(SandboxErrorKind::InvalidReturnValue {
            actual: actual.into(),
        })
    }

    /// Creates a missing search path error.
    #[must_use]
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(SandboxErrorKind::PathNotFound { path: path.into() })
    }

    /// Returns true if this error rejected a relative module reference.
    #[must_use]
    pub fn is_relative_import(&self) -> bool {
        matches!(self.kind, SandboxErrorKind::RelativeImport { .. })
    }

    /// Returns true if the script's return value had the wrong shape.
    #[must_use]
    pub fn is_invalid_return_value(&self) -> bool {
        matches!(self.kind, SandboxErrorKind::InvalidReturnValue { .. })
    }
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SandboxErrorKind::Init { reason } => {
                write!(f, "sandbox initialization failed: {}", reason)
            }
            SandboxErrorKind::Script { reason } => {
                write!(f, "script execution failed: {}", reason)
            }
            SandboxErrorKind::RelativeImport { module } => {
                write!(
                    f,
                    "relative module reference '{}' is not allowed; \
                     require modules by name from a registered search path",
                    module
                )
            }
            SandboxErrorKind::InvalidReturnValue { actual } => {
                write!(
                    f,
                    "script must return a table (directly or through a function chain), got {}",
                    actual
                )
            }
            SandboxErrorKind::PathNotFound { path } => {
                write!(
                    f,
                    "search path '{}' does not exist; check the script's directory",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SandboxError {}
