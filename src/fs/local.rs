//! Real-filesystem file processor.

use super::{FileError, FileProcessor};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File processor backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileProcessor;

impl LocalFileProcessor {
    /// Creates a new local file processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FileProcessor for LocalFileProcessor {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileError> {
        fs::read(path).map_err(|e| FileError::read(path, e.to_string()))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!(dir = %parent.display(), "creating output directory");
                fs::create_dir_all(parent).map_err(|e| FileError::write(path, e.to_string()))?;
            }
        }
        fs::write(path, data).map_err(|e| FileError::write(path, e.to_string()))
    }

    fn find_files(&self, globs: &[String]) -> Result<Vec<PathBuf>, FileError> {
        let mut result = Vec::new();
        for pattern in globs {
            let paths = glob::glob(pattern)
                .map_err(|e| FileError::pattern(pattern, e.to_string()))?;
            for entry in paths {
                let path = entry.map_err(|e| FileError::read(e.path(), e.to_string()))?;
                result.push(path);
            }
        }
        Ok(result)
    }
}
