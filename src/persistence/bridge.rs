//! Loads and saves an actor's collections through a [`KeyValueStore`].
//!
//! Failures never reach callers. A missing, unreadable or corrupt record
//! loads as the empty default; a failed write is logged and dropped.

use serde::de::DeserializeOwned;
use serde::Serialize;
use super::{CollectionKind, KeyValueStore, StorageKey};
use crate::domain::aggregates::{Cart, RecentlyViewed, Wishlist};
use crate::domain::promotion::PromotionState;
use crate::domain::value_objects::ActorId;

/// Everything persisted for one actor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorState {
    pub cart: Cart,
    pub wishlist: Wishlist,
    pub recently_viewed: RecentlyViewed,
    pub promotion: PromotionState,
}

#[derive(Clone, Debug)]
pub struct PersistenceBridge<S> {
    storage: S,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    pub fn new(storage: S) -> Self { Self { storage } }

    pub fn storage(&self) -> &S { &self.storage }
    pub fn into_storage(self) -> S { self.storage }

    pub fn load<T: DeserializeOwned + Default>(&self, actor: &ActorId, collection: CollectionKind) -> T {
        let key = StorageKey::new(actor.clone(), collection);
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(error) => {
                tracing::warn!(key = %key, %error, "failed to read record, using empty default");
                return T::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|error| {
            tracing::warn!(key = %key, %error, "corrupt record, using empty default");
            T::default()
        })
    }

    pub fn save<T: Serialize>(&self, actor: &ActorId, collection: CollectionKind, value: &T) {
        let key = StorageKey::new(actor.clone(), collection);
        let result = match serde_json::to_string(value) {
            Ok(json) => self.storage.put(&key, json),
            Err(error) => {
                tracing::error!(key = %key, %error, "failed to encode record");
                return;
            }
        };
        if let Err(error) = result {
            tracing::error!(key = %key, %error, "failed to write record");
        }
    }

    /// An inactive promotion is stored as an absent record.
    pub fn save_promotion(&self, actor: &ActorId, promotion: &PromotionState) {
        if promotion.is_active() {
            self.save(actor, CollectionKind::Promotion, promotion);
            return;
        }
        let key = StorageKey::new(actor.clone(), CollectionKind::Promotion);
        if let Err(error) = self.storage.remove(&key) {
            tracing::error!(key = %key, %error, "failed to remove record");
        }
    }

    /// Loads all four collections and repairs anything that breaks an invariant.
    pub fn load_state(&self, actor: &ActorId) -> ActorState {
        let mut state = ActorState {
            cart: self.load(actor, CollectionKind::Cart),
            wishlist: self.load(actor, CollectionKind::Wishlist),
            recently_viewed: self.load(actor, CollectionKind::RecentlyViewed),
            promotion: self.load(actor, CollectionKind::Promotion),
        };

        let dropped = state.cart.sanitize();
        if dropped > 0 {
            tracing::warn!(actor = %actor, dropped, "dropped invalid cart lines");
        }
        let dropped = state.wishlist.sanitize();
        if dropped > 0 {
            tracing::warn!(actor = %actor, dropped, "dropped duplicate wishlist entries");
        }
        let dropped = state.recently_viewed.sanitize();
        if dropped > 0 {
            tracing::warn!(actor = %actor, dropped, "trimmed recently viewed history");
        }
        if !state.promotion.is_consistent() {
            tracing::warn!(actor = %actor, code = ?state.promotion.code(), "discarding unknown promotion");
            state.promotion = PromotionState::default();
        }
        state
    }
}
