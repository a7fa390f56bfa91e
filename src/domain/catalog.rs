//! Catalog product records
//!
//! Products arrive from the catalog collaborator and are never mutated here;
//! cart lines, wishlist entries and history entries hold snapshots of them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use validator::{Validate, ValidationError};
use crate::domain::value_objects::money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Product {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "price_in_range")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,
    #[serde(default)]
    pub reviews: u32,
    /// `None` means unlimited.
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub seller: String,
    /// Percent off list price.
    #[serde(default)]
    #[validate(range(max = 100))]
    pub discount: Option<u8>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(), name: name.into(), description: String::new(), price,
            image: String::new(), category: String::new(), rating: None, reviews: 0,
            stock: None, seller: String::new(), discount: None,
            tags: BTreeSet::new(), specs: BTreeMap::new(),
        }
    }

    pub fn with_discount(mut self, percent: u8) -> Self { self.discount = Some(percent); self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock = Some(stock); self }

    /// Unit price after the product's own percentage discount.
    pub fn effective_price(&self) -> Decimal {
        match self.discount {
            Some(percent) if percent > 0 => {
                let percent = Decimal::from(percent.min(100));
                money::mul(self.price, Decimal::ONE - percent / Decimal::ONE_HUNDRED)
            }
            _ => self.price,
        }
    }

    pub fn is_in_stock(&self) -> bool { self.stock.map_or(true, |s| s > 0) }
}

/// Highest unit price accepted from the catalog (10^15).
pub fn max_unit_price() -> Decimal { Decimal::new(1_000_000_000_000_000, 0) }

fn price_in_range(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    if *price > max_unit_price() {
        return Err(ValidationError::new("price_too_large"));
    }
    Ok(())
}
