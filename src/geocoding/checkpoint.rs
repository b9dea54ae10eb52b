//! Periodic snapshots of geocoding progress.

use std::path::{Path, PathBuf};

use crate::models::EnrichedRecord;
use crate::storage::{read_json, write_json, StorageError};

/// Writes `{prefix}_{count}.json` snapshots into a directory.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    dir: PathBuf,
    prefix: String,
}

impl CheckpointWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the snapshot holding the first `count` records.
    pub fn path_for(&self, count: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.json", self.prefix, count))
    }

    /// Write every record processed so far, tagged with their count.
    pub fn write(&self, records: &[EnrichedRecord]) -> Result<PathBuf, StorageError> {
        let path = self.path_for(records.len());
        write_json(&path, records)?;
        Ok(path)
    }
}

/// Load a snapshot written by [`CheckpointWriter`].
pub fn load_checkpoint(path: &Path) -> Result<Vec<EnrichedRecord>, StorageError> {
    read_json(path)
}
