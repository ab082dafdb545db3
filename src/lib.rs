//! # luaform: Lua scripts in, configuration artifacts out
//!
//! Executes small Lua scripts inside isolated sandboxed interpreter
//! instances and serializes whatever they return as YAML or JSON.
//!
//! ## Architecture
//!
//! - **Value**: the language-neutral model every script result converts into
//! - **Sandbox**: one interpreter VM per worker, with built-in modules,
//!   search-path registration, and override-merge module resolution
//! - **Pipeline**: producer, worker pool, and writer pool over bounded
//!   channels
//! - **Formatter**: pluggable YAML/JSON marshaling
//! - **FileProcessor**: file access behind a trait (local disk or in-memory)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use luaform::prelude::*;
//!
//! let config = GeneratorConfig::new().with_format("json");
//! config.validate()?;
//!
//! let processor = LocalFileProcessor::new();
//! let formatter = Formatter::new(config.parsed_format(), config.suffix.as_deref());
//! let files = processor.find_files(&["configs/**/*.lua".to_string()])?;
//!
//! pipeline::run(files, &processor, &formatter, &config)?;
//! ```

pub mod config;
pub mod format;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod sandbox;
pub mod value;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigError, GeneratorConfig};
    pub use crate::format::{Format, FormatError, Formatter};
    pub use crate::fs::{FileProcessor, LocalFileProcessor, MemoryFileProcessor};
    pub use crate::pipeline::{self, PipelineError, ScriptJob, ScriptResult};
    pub use crate::sandbox::{Sandbox, SandboxConfig, SandboxError};
    pub use crate::value::Value;
}
