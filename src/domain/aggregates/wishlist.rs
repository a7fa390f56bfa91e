//! Wishlist Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::domain::catalog::Product;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product: Product,
    pub date_added: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    entries: Vec<WishlistEntry>,
}

impl Wishlist {
    pub fn new() -> Self { Self::default() }
    pub fn entries(&self) -> &[WishlistEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn contains(&self, product_id: &str) -> bool { self.entries.iter().any(|e| e.product.id == product_id) }

    /// Idempotent: an existing entry keeps its original `date_added`.
    pub fn add(&mut self, product: &Product, now: DateTime<Utc>) -> bool {
        if self.contains(&product.id) { return false; }
        self.entries.push(WishlistEntry { product: product.clone(), date_added: now });
        true
    }

    pub fn remove(&mut self, product_id: &str) -> bool { self.take(product_id).is_some() }

    pub fn take(&mut self, product_id: &str) -> Option<WishlistEntry> {
        let idx = self.entries.iter().position(|e| e.product.id == product_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    pub fn sanitize(&mut self) -> usize {
        let before = self.entries.len();
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert(e.product.id.clone()));
        before - self.entries.len()
    }
}
