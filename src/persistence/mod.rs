//! Per-actor persistence
//!
//! Every persisted record is addressed by a structured [`StorageKey`]: the
//! actor that owns it and which collection it holds. Backends only ever see
//! opaque JSON text.

pub mod bridge;
pub mod file;
pub mod memory;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use crate::domain::value_objects::ActorId;

pub use bridge::{ActorState, PersistenceBridge};
pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind { Cart, Wishlist, RecentlyViewed, Promotion }

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
            Self::RecentlyViewed => "recently_viewed",
            Self::Promotion => "promotion",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    pub actor: ActorId,
    pub collection: CollectionKind,
}

impl StorageKey {
    pub fn new(actor: ActorId, collection: CollectionKind) -> Self { Self { actor, collection } }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}/{}", self.actor, self.collection) }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Durable key-value storage shared by all actors.
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when nothing was ever stored under `key`.
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError>;
    fn put(&self, key: &StorageKey, value: String) -> Result<(), StorageError>;
    fn remove(&self, key: &StorageKey) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> { (**self).get(key) }
    fn put(&self, key: &StorageKey, value: String) -> Result<(), StorageError> { (**self).put(key, value) }
    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> { (**self).remove(key) }
}
