//! Key-value persistence substrate.
//!
//! One JSON blob per logical key, stored as `<key>.json` under the data
//! directory. Writes use a write-to-temp-then-rename pattern so a crash
//! mid-write never leaves a half-serialized blob behind; a corrupt blob on
//! read surfaces as a `StorageError` for the caller to log and swallow.
//!
//! Each store owns a disjoint subset of keys (see [`crate::constants::keys`]).
//! That partitioning is a convention, not enforced here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Handle to the on-disk substrate. Cheap to clone; all stores share one.
#[derive(Clone)]
pub struct Storage {
    dir: Arc<PathBuf>,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir: Arc::new(dir) })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Serialize `value` and write it atomically under `key`. Each write
    /// stages through its own temp file, so two writers racing on the same
    /// key cannot clobber each other's staging copy; the renames serialize
    /// at the filesystem and last-writer-wins.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value)?;
        let path = self.blob_path(key);
        let temp = self.dir.join(format!("{key}.{}.tmp", Uuid::new_v4().simple()));
        std::fs::write(&temp, &bytes)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    /// Read and parse the blob under `key`. A missing key is `Ok(None)`,
    /// not an error; an unreadable or unparsable blob is an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.blob_path(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Remove the blob under `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.blob_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every blob the application owns. Test/reset flows only.
    pub fn clear(&self) -> Result<(), StorageError> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }

    /// List all present keys, in no particular order.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(self.dir.as_path())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}
