//! Recently viewed products

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::domain::catalog::Product;

pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Most-recent-first, deduplicated by product id, capped at [`RECENTLY_VIEWED_LIMIT`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentlyViewed {
    products: Vec<Product>,
}

impl RecentlyViewed {
    pub fn new() -> Self { Self::default() }
    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn record(&mut self, product: &Product) {
        self.products.retain(|p| p.id != product.id);
        self.products.insert(0, product.clone());
        self.products.truncate(RECENTLY_VIEWED_LIMIT);
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.products.is_empty();
        self.products.clear();
        changed
    }

    pub fn sanitize(&mut self) -> usize {
        let before = self.products.len();
        let mut seen = HashSet::new();
        self.products.retain(|p| seen.insert(p.id.clone()));
        self.products.truncate(RECENTLY_VIEWED_LIMIT);
        before - self.products.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(n: usize) -> Product { Product::new(format!("P{n}"), format!("Item {n}"), Decimal::ONE) }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = RecentlyViewed::new();
        for n in 1..=11 { history.record(&product(n)); }
        assert_eq!(history.len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(history.products()[0].id, "P11");
        assert!(history.products().iter().all(|p| p.id != "P1"));
    }

    #[test]
    fn test_revisit_moves_to_front() {
        let mut history = RecentlyViewed::new();
        for n in 1..=3 { history.record(&product(n)); }
        history.record(&product(1));
        let ids: Vec<_> = history.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["P1", "P3", "P2"]);
    }
}
