//! Storage helpers for pipeline files on disk.
//!
//! Every write replaces the target wholesale: content goes to a temp file in
//! the same directory which is then renamed over the destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("required input {0} does not exist")]
    MissingInput(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Atomically write `contents` to `path`, creating parent directories.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_error(parent))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_error(parent))?;
    tmp.write_all(contents).map_err(io_error(path))?;
    tmp.persist(path).map_err(|e| StorageError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Write a value as indented JSON. Non-ASCII text is kept as is.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut json = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push(b'\n');
    write_atomic(path, &json)
}

/// Read a JSON file that an earlier stage must have produced.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Err(StorageError::MissingInput(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&contents).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy a generated file into another directory, keeping its file name.
pub fn install_copy(source: &Path, dest_dir: &Path) -> Result<PathBuf, StorageError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| StorageError::MissingInput(source.to_path_buf()))?;
    let dest = dest_dir.join(file_name);
    let contents = std::fs::read(source).map_err(io_error(source))?;
    write_atomic(&dest, &contents)?;
    Ok(dest)
}
