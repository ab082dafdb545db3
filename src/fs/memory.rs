//! In-memory file processor for deterministic tests.

use super::{FileError, FileProcessor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// File processor storing file data in a map.
#[derive(Debug, Default)]
pub struct MemoryFileProcessor {
    data: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileProcessor {
    /// Creates an empty in-memory file processor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no files are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileProcessor for MemoryFileProcessor {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileError> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::not_found(path))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileError> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn find_files(&self, globs: &[String]) -> Result<Vec<PathBuf>, FileError> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let mut result = Vec::new();
        for pattern_text in globs {
            let pattern = glob::Pattern::new(pattern_text)
                .map_err(|e| FileError::pattern(pattern_text, e.to_string()))?;
            for path in data.keys() {
                if pattern.matches_path(path) {
                    result.push(path.clone());
                }
            }
        }
        result.sort();
        Ok(result)
    }
}
