//! File-per-key JSON store
//!
//! Files are stored as `{dir}/{key}.json`. Writes go to a temporary file that
//! is synced and renamed over the target, so a crash never leaves a torn record.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{validate_key, KeyValueStore};
use crate::error::StorageError;

const RECORD_EXTENSION: &str = "json";

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, RECORD_EXTENSION)))
    }

    fn atomic_write(path: &Path, contents: &str) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");

        let file = File::create(&temp_path).map_err(|e| StorageError::io(&temp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(contents.as_bytes())
            .map_err(|e| StorageError::io(&temp_path, e))?;
        writer.flush().map_err(|e| StorageError::io(&temp_path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| StorageError::io(&temp_path, e))?;

        fs::rename(&temp_path, path).map_err(|e| StorageError::io(path, e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        Self::atomic_write(&path, value)?;
        tracing::debug!(key, path = %path.display(), "Wrote record");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}
