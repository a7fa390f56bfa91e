//! In-process storage backend

use std::collections::HashMap;
use std::sync::RwLock;
use super::{KeyValueStore, StorageError, StorageKey};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.records.read().map(|r| r.len()).unwrap_or(0) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &StorageKey, value: String) -> Result<(), StorageError> {
        self.records.write().map_err(|_| StorageError::Poisoned)?.insert(key.clone(), value);
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.records.write().map_err(|_| StorageError::Poisoned)?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ActorId;
    use crate::persistence::CollectionKind;

    #[test]
    fn test_keys_are_structured() {
        let storage = MemoryStorage::new();
        let a = StorageKey::new(ActorId::new("a_cart").unwrap(), CollectionKind::Wishlist);
        let b = StorageKey::new(ActorId::new("a").unwrap(), CollectionKind::Cart);
        storage.put(&a, "[1]".into()).unwrap();
        assert_eq!(storage.get(&b).unwrap(), None);
        assert_eq!(storage.get(&a).unwrap().as_deref(), Some("[1]"));
        storage.remove(&a).unwrap();
        assert!(storage.is_empty());
    }
}
