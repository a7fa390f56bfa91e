//! OpenSASE Storefront
//!
//! Shopper-side commerce state for the storefront.
//!
//! ## Features
//! - Cart with saved-for-later lines and derived totals
//! - Wishlist and recently viewed history
//! - Promotion codes
//! - Per-actor persistence (guest or signed-in user)
//! - Simulated checkout
//! - HTTP API over the same store

pub mod api;
pub mod config;
pub mod domain;
pub mod identity;
pub mod persistence;
pub mod store;

use std::sync::Arc;
use thiserror::Error;

pub use config::StorefrontConfig;
pub use domain::aggregates::{Cart, CartLine, CheckoutContact, LineStatus, OrderConfirmation, RecentlyViewed, Wishlist, WishlistEntry};
pub use domain::catalog::Product;
pub use domain::promotion::{PromoOutcome, PromoRejection, PromotionState};
pub use domain::value_objects::ActorId;
pub use identity::{FixedIdentity, IdentityResolver, SessionIdentity};
pub use persistence::{CollectionKind, FileStorage, KeyValueStore, MemoryStorage, StorageKey};
pub use store::{CartSummary, CommerceStore};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Storage error: {0}")]
    Storage(#[from] persistence::StorageError),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Shared storage handle used by the HTTP layer.
pub type SharedStorage = Arc<dyn KeyValueStore>;

/// Picks the storage backend named by `config`.
pub fn open_storage(config: &StorefrontConfig) -> Result<SharedStorage> {
    match &config.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using file storage");
            Ok(Arc::new(FileStorage::open(dir)?))
        }
        None => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_storage_memory_by_default() {
        let storage = open_storage(&StorefrontConfig::default()).unwrap();
        let key = StorageKey::new(ActorId::guest(), CollectionKind::Cart);
        assert!(storage.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_open_storage_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig { data_dir: Some(dir.path().join("state")), ..StorefrontConfig::default() };
        let storage = open_storage(&config).unwrap();
        let key = StorageKey::new(ActorId::guest(), CollectionKind::Wishlist);
        storage.put(&key, "[]".into()).unwrap();
        assert!(dir.path().join("state").is_dir());
    }
}
