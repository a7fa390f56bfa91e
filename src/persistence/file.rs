//! Directory-backed storage: one JSON file per actor and collection.
//!
//! Actor ids are hex encoded into directory names, so no id can collide with
//! another or escape the root.

use std::io::ErrorKind;
use std::path::PathBuf;
use super::{KeyValueStore, StorageError, StorageKey};

#[derive(Clone, Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "file storage opened");
        Ok(Self { root })
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        let dir: String = key.actor.as_str().bytes().map(|b| format!("{b:02x}")).collect();
        self.root.join(dir).join(format!("{}.json", key.collection.as_str()))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &StorageKey, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Readers never observe a half-written record.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
