//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::domain::catalog::Product;
use crate::domain::value_objects::money;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus { #[default] Active, SavedForLater }

/// One product's presence in the cart. Quantity is always at least 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub status: LineStatus,
}

impl CartLine {
    pub fn product_id(&self) -> &str { &self.product.id }
    pub fn is_saved_for_later(&self) -> bool { self.status == LineStatus::SavedForLater }
    pub fn unit_price(&self) -> Decimal { self.product.effective_price() }
    pub fn line_total(&self) -> Decimal { money::mul(self.unit_price(), Decimal::from(self.quantity)) }
}

/// Cart lines for a single actor, keyed by product id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn active_lines(&self) -> impl Iterator<Item = &CartLine> { self.lines.iter().filter(|l| !l.is_saved_for_later()) }
    pub fn saved_lines(&self) -> impl Iterator<Item = &CartLine> { self.lines.iter().filter(|l| l.is_saved_for_later()) }
    pub fn get(&self, product_id: &str) -> Option<&CartLine> { self.lines.iter().find(|l| l.product_id() == product_id) }
    pub fn contains(&self, product_id: &str) -> bool { self.get(product_id).is_some() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Adds `quantity` of `product`. A saved-for-later line is reactivated with
    /// exactly `quantity`; an active line is incremented. Zero is ignored.
    pub fn add(&mut self, product: &Product, quantity: u32) -> bool {
        if quantity == 0 { return false; }
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) if line.is_saved_for_later() => {
                line.quantity = quantity;
                line.status = LineStatus::Active;
            }
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { product: product.clone(), quantity, status: LineStatus::Active }),
        }
        true
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id() != product_id);
        self.lines.len() != before
    }

    /// Sets the quantity absolutely; zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        if quantity == 0 { return self.remove(product_id); }
        match self.lines.iter_mut().find(|l| l.product_id() == product_id) {
            Some(line) if line.quantity != quantity => { line.quantity = quantity; true }
            _ => false,
        }
    }

    pub fn save_for_later(&mut self, product_id: &str) -> bool { self.set_status(product_id, LineStatus::SavedForLater) }
    pub fn move_to_cart(&mut self, product_id: &str) -> bool { self.set_status(product_id, LineStatus::Active) }

    fn set_status(&mut self, product_id: &str, status: LineStatus) -> bool {
        match self.lines.iter_mut().find(|l| l.product_id() == product_id) {
            Some(line) if line.status != status => { line.status = status; true }
            _ => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }

    /// Removes and returns the active lines, keeping saved-for-later ones.
    pub fn take_active(&mut self) -> Vec<CartLine> {
        let (active, saved): (Vec<CartLine>, Vec<CartLine>) = std::mem::take(&mut self.lines).into_iter().partition(|l| !l.is_saved_for_later());
        self.lines = saved;
        active
    }

    pub fn total_items(&self) -> u64 { self.active_lines().map(|l| u64::from(l.quantity)).sum() }

    /// Sum of active line totals after per-product discounts.
    pub fn subtotal(&self) -> Decimal { money::sum(self.active_lines().map(CartLine::line_total)) }

    /// Drops zero-quantity, negatively priced and duplicate lines; returns how many were dropped.
    pub fn sanitize(&mut self) -> usize {
        let before = self.lines.len();
        let mut seen = HashSet::new();
        self.lines.retain(|l| l.quantity > 0 && !l.product.price.is_sign_negative() && seen.insert(l.product.id.clone()));
        before - self.lines.len()
    }
}
