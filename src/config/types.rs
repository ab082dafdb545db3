//! Configuration types.

use crate::format::Format;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Output format identifier (`yaml` or `json`).
    pub format: String,
    /// Output file suffix override; the formatter's canonical suffix when
    /// unset.
    pub suffix: Option<String>,
    /// Suffix forming `<module>-<suffix>` override modules; no override
    /// resolution when unset.
    pub override_suffix: Option<String>,
    /// Report intended output paths instead of writing files.
    pub dry_run: bool,
    /// Number of worker threads, each owning one sandbox.
    pub workers: usize,
    /// Number of writer threads.
    pub writers: usize,
    /// Capacity of the job channel.
    pub job_capacity: usize,
    /// Capacity of the result channel.
    pub result_capacity: usize,
    /// Root directory generated files are written under.
    pub output_root: PathBuf,
}

impl GeneratorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format identifier.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the output file suffix override.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Sets the override-merge suffix.
    #[must_use]
    pub fn with_override_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.override_suffix = Some(suffix.into());
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the writer count.
    #[must_use]
    pub fn with_writers(mut self, writers: usize) -> Self {
        self.writers = writers;
        self
    }

    /// Sets the job channel capacity.
    #[must_use]
    pub fn with_job_capacity(mut self, capacity: usize) -> Self {
        self.job_capacity = capacity;
        self
    }

    /// Sets the result channel capacity.
    #[must_use]
    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    /// Sets the output root directory.
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Checks the configuration before any pipeline work begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.format
            .parse::<Format>()
            .map_err(|_| ConfigError::unsupported_format(&self.format))?;
        if self.workers == 0 {
            return Err(ConfigError::invalid_value(
                "workers",
                "must be greater than 0",
            ));
        }
        if self.writers == 0 {
            return Err(ConfigError::invalid_value(
                "writers",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// The parsed output format.
    ///
    /// Call [`validate`](Self::validate) first; an unparseable identifier
    /// falls back to the default format here.
    #[must_use]
    pub fn parsed_format(&self) -> Format {
        self.format.parse().unwrap_or_default()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            format: "yaml".to_string(),
            suffix: None,
            override_suffix: None,
            dry_run: false,
            workers: 4,
            writers: 2,
            job_capacity: 8,
            result_capacity: 8,
            output_root: PathBuf::from("."),
        }
    }
}

/// Errors raised by configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The specific error that occurred
    pub kind: ConfigErrorKind,
}

/// Specific configuration error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The output format identifier is not recognized
    UnsupportedFormat {
        /// The identifier that failed to resolve
        format: String,
    },
    /// A configuration field holds an invalid value
    InvalidValue {
        /// The offending field
        field: String,
        /// Why it was invalid
        reason: String,
    },
}

impl ConfigError {
    /// Creates a new ConfigError with the given kind.
    #[must_use]
    pub fn new(kind: ConfigErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an unsupported format error.
    #[must_use]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::UnsupportedFormat {
            format: format.into(),
        })
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if the format identifier was not recognized.
    #[must_use]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::UnsupportedFormat { .. })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConfigErrorKind::UnsupportedFormat { format } => {
                write!(
                    f,
                    "unsupported output format '{}'; expected 'yaml' or 'json'",
                    format
                )
            }
            ConfigErrorKind::InvalidValue { field, reason } => {
                write!(f, "invalid configuration for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = GeneratorConfig::default();
        assert_eq!(config.format, "yaml");
        assert_eq!(config.workers, 4);
        assert_eq!(config.writers, 2);
        assert_eq!(config.job_capacity, 8);
        assert_eq!(config.result_capacity, 8);
        assert!(!config.dry_run);
        assert_eq!(config.output_root, PathBuf::from("."));
        assert!(config.suffix.is_none());
        assert!(config.override_suffix.is_none());
    }

    #[test]
    fn new_equals_default() {
        assert_eq!(GeneratorConfig::new(), GeneratorConfig::default());
    }

    #[test]
    fn builder_pattern() {
        let config = GeneratorConfig::new()
            .with_format("json")
            .with_suffix("conf.json")
            .with_override_suffix("prod")
            .with_dry_run(true)
            .with_workers(8)
            .with_writers(3)
            .with_job_capacity(32)
            .with_result_capacity(16)
            .with_output_root("build/out");

        assert_eq!(config.format, "json");
        assert_eq!(config.suffix.as_deref(), Some("conf.json"));
        assert_eq!(config.override_suffix.as_deref(), Some("prod"));
        assert!(config.dry_run);
        assert_eq!(config.workers, 8);
        assert_eq!(config.writers, 3);
        assert_eq!(config.job_capacity, 32);
        assert_eq!(config.result_capacity, 16);
        assert_eq!(config.output_root, PathBuf::from("build/out"));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_format() {
        let config = GeneratorConfig::new().with_format("toml");
        let error = config.validate().unwrap_err();
        assert!(error.is_unsupported_format());
        assert!(error.to_string().contains("toml"));
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let config = GeneratorConfig::new().with_workers(0);
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("workers"));
    }

    #[test]
    fn validate_rejects_zero_writers() {
        let config = GeneratorConfig::new().with_writers(0);
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("writers"));
    }

    #[test]
    fn parsed_format_matches_identifier() {
        assert_eq!(
            GeneratorConfig::new().with_format("json").parsed_format(),
            Format::Json
        );
        assert_eq!(GeneratorConfig::default().parsed_format(), Format::Yaml);
    }

    #[test]
    fn serialization_roundtrip() {
        let config = GeneratorConfig::new()
            .with_format("json")
            .with_override_suffix("prod");
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn errors_are_clone_and_eq() {
        let error1 = ConfigError::unsupported_format("ini");
        let error2 = error1.clone();
        assert_eq!(error1, error2);
        assert_ne!(error1, ConfigError::invalid_value("workers", "x"));
    }
}
