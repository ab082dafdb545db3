//! Pluggable output serialization.
//!
//! A [`Formatter`] couples a marshaling backend with the canonical file
//! suffix for its format. Formats are selected by identifier (`yaml`,
//! `json`); unknown identifiers are a configuration error surfaced before
//! any pipeline work begins.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised by format selection and marshaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// The specific error that occurred
    pub kind: FormatErrorKind,
}

/// Specific format error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The format identifier is not recognized
    UnknownFormat {
        /// The identifier that failed to resolve
        format: String,
    },
    /// Serialization of a value failed
    Marshal {
        /// Reason reported by the serializer
        reason: String,
    },
}

impl FormatError {
    /// Creates a new FormatError with the given kind.
    #[must_use]
    pub fn new(kind: FormatErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an unknown format error.
    #[must_use]
    pub fn unknown_format(format: impl Into<String>) -> Self {
        Self::new(FormatErrorKind::UnknownFormat {
            format: format.into(),
        })
    }

    /// Creates a marshal failure error.
    #[must_use]
    pub fn marshal(reason: impl Into<String>) -> Self {
        Self::new(FormatErrorKind::Marshal {
            reason: reason.into(),
        })
    }

    /// Returns true if the format identifier was not recognized.
    #[must_use]
    pub fn is_unknown_format(&self) -> bool {
        matches!(self.kind, FormatErrorKind::UnknownFormat { .. })
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FormatErrorKind::UnknownFormat { format } => {
                write!(
                    f,
                    "unsupported output format '{}'; expected 'yaml' or 'json'",
                    format
                )
            }
            FormatErrorKind::Marshal { reason } => {
                write!(f, "failed to serialize value: {}", reason)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// YAML output.
    #[default]
    Yaml,
    /// JSON output.
    Json,
}

impl Format {
    /// The canonical file suffix for this format.
    #[must_use]
    pub fn canonical_suffix(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yaml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(FormatError::unknown_format(other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_suffix())
    }
}

/// Marshals values and names the output-file suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    format: Format,
    suffix: String,
}

impl Formatter {
    /// Creates a formatter for the given format.
    ///
    /// An explicitly configured suffix wins over the format's canonical one.
    #[must_use]
    pub fn new(format: Format, suffix_override: Option<&str>) -> Self {
        let suffix = suffix_override
            .unwrap_or_else(|| format.canonical_suffix())
            .to_string();
        Self { format, suffix }
    }

    /// The suffix appended to output file names.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Serializes a value into output bytes.
    pub fn marshal(&self, value: &Value) -> Result<Vec<u8>, FormatError> {
        match self.format {
            Format::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| FormatError::marshal(e.to_string())),
            Format::Json => {
                serde_json::to_vec(value).map_err(|e| FormatError::marshal(e.to_string()))
            }
        }
    }
}
