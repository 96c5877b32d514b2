use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Backend that stores each key as `<key>.json` inside a directory.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new store rooted at `base_dir`. The directory is created on
    /// the first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable(format!("{}: {e}", path.display()))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let path = self.key_path(key);
        // the previous value stays intact if the write fails
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| match e.kind() {
            ErrorKind::StorageFull => StorageError::QuotaExceeded,
            _ => StorageError::Unavailable(e.to_string()),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote key");
        Ok(())
    }
}
