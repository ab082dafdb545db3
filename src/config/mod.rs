//! Runtime configuration for a generation run.
//!
//! Configuration arrives fully parsed from the CLI; this module only holds
//! the validated shape the pipeline consumes.
//!
//! # Example
//!
//! ```rust
//! use luaform::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::new()
//!     .with_format("json")
//!     .with_workers(8)
//!     .with_output_root("build/config");
//! assert!(config.validate().is_ok());
//! ```

mod types;

pub use types::{ConfigError, ConfigErrorKind, GeneratorConfig};
