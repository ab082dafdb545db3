//! Pipeline work items and output naming.

use crate::value::Value;
use std::path::{Component, Path, PathBuf};

/// One discovered script, ready for execution.
///
/// Created by the producer, consumed exactly once by exactly one worker,
/// immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptJob {
    /// Where the script was read from.
    pub source_path: PathBuf,
    /// The script's own directory, registered as a module search path.
    pub source_dir: PathBuf,
    /// The script source text.
    pub raw_content: String,
    /// Directory the output file will be written into.
    pub output_dir: PathBuf,
    /// Output file name without suffix.
    pub output_stem: String,
    /// Output file suffix.
    pub output_suffix: String,
}

/// One executed script's converted result.
///
/// Created by a worker, consumed exactly once by one writer, immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptResult {
    /// Where the script was read from.
    pub source_path: PathBuf,
    /// Directory the output file will be written into.
    pub output_dir: PathBuf,
    /// Output file name without suffix.
    pub output_stem: String,
    /// Output file suffix.
    pub output_suffix: String,
    /// The converted value.
    pub value: Value,
}

impl ScriptResult {
    /// The final path this result will be persisted to.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.output_dir, &self.output_stem, &self.output_suffix)
    }
}

/// Joins the output root with the directory portion of the source path.
///
/// Root and parent components of the source are dropped so absolute inputs
/// stay inside the output root.
#[must_use]
pub fn output_dir(root: &Path, source: &Path) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let relative: PathBuf = dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    root.join(relative)
}

/// The source file name with its original extension stripped.
#[must_use]
pub fn output_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Joins directory, stem, and suffix into the final output path.
#[must_use]
pub fn output_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, suffix))
}
