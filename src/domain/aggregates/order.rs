//! Order confirmation produced by the simulated checkout
//!
//! No payment is taken. Placing an order snapshots the active cart lines and
//! the promotion in force at that moment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::promotion::PromotionState;
use crate::domain::value_objects::{money, ActorId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CheckoutContact {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1, max = 16))]
    pub zip: String,
    #[validate(length(min = 2))]
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine { pub product_id: String, pub name: String, pub quantity: u32, pub unit_price: Decimal, pub total: Decimal }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub actor: ActorId,
    pub contact: CheckoutContact,
    pub lines: Vec<OrderLine>,
    pub promo_code: Option<String>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    pub fn place(actor: ActorId, contact: CheckoutContact, lines: &[CartLine], promotion: &PromotionState) -> Result<Self, OrderError> {
        if lines.is_empty() { return Err(OrderError::NoItems); }
        let lines: Vec<OrderLine> = lines.iter().map(|l| OrderLine {
            product_id: l.product.id.clone(), name: l.product.name.clone(), quantity: l.quantity,
            unit_price: l.unit_price(), total: l.line_total(),
        }).collect();
        let subtotal = money::sum(lines.iter().map(|l| l.total));
        let discount = money::mul(subtotal, promotion.discount());
        Ok(Self {
            order_id: Uuid::now_v7(), actor, contact, lines,
            promo_code: promotion.code().map(str::to_string),
            subtotal, discount, total: money::sub(subtotal, discount), placed_at: Utc::now(),
        })
    }

    pub fn item_count(&self) -> u64 { self.lines.iter().map(|l| u64::from(l.quantity)).sum() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NoItems => write!(f, "No items") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::Cart;
    use crate::domain::catalog::Product;

    fn contact() -> CheckoutContact {
        CheckoutContact {
            name: "Ada Obi".into(), email: "ada@example.com".into(), street: "1 Marina".into(),
            city: "Lagos".into(), zip: "101001".into(), country: "NG".into(), phone: None,
        }
    }

    #[test]
    fn test_place_order_totals() {
        let mut cart = Cart::new();
        cart.add(&Product::new("P1", "Widget", Decimal::new(100, 0)).with_discount(10), 2);
        let promo = PromotionState::for_code("FREESHIP").unwrap();
        let order = OrderConfirmation::place(ActorId::guest(), contact(), cart.lines(), &promo).unwrap();
        assert_eq!(order.subtotal, Decimal::new(180, 0));
        assert_eq!(order.discount, Decimal::new(27, 0));
        assert_eq!(order.total, Decimal::new(153, 0));
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.promo_code.as_deref(), Some("FREESHIP"));
    }

    #[test]
    fn test_place_without_items() {
        let err = OrderConfirmation::place(ActorId::guest(), contact(), &[], &PromotionState::default()).unwrap_err();
        assert_eq!(err, OrderError::NoItems);
    }

    #[test]
    fn test_contact_validation() {
        assert!(contact().validate().is_ok());
        let bad = CheckoutContact { email: "not-an-email".into(), ..contact() };
        assert!(bad.validate().is_err());
    }
}
