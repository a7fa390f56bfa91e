//! Commerce state store
//!
//! Single owner of one actor's cart, wishlist, recently viewed history and
//! active promotion. Every mutation that changes a collection writes that
//! collection through to storage before returning. Switching actor replaces
//! all four collections at once; since mutations take `&mut self`, none can
//! straddle a switch.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::{Cart, CartLine, CheckoutContact, OrderConfirmation, RecentlyViewed, Wishlist};
use crate::domain::catalog::Product;
use crate::domain::promotion::{PromoOutcome, PromoRejection, PromotionState};
use crate::domain::value_objects::{money, ActorId};
use crate::identity::IdentityResolver;
use crate::persistence::{ActorState, CollectionKind, KeyValueStore, PersistenceBridge};

/// Read model handed to the UI.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartSummary {
    pub actor: ActorId,
    pub lines: Vec<CartLine>,
    pub saved_for_later: Vec<CartLine>,
    pub total_items: u64,
    pub subtotal: Decimal,
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub savings: Decimal,
    pub total: Decimal,
}

pub struct CommerceStore<S> {
    bridge: PersistenceBridge<S>,
    actor: ActorId,
    state: ActorState,
}

impl<S: KeyValueStore> CommerceStore<S> {
    /// Opens the store for whoever `identity` reports as current.
    pub fn open(storage: S, identity: &dyn IdentityResolver) -> Self {
        Self::for_actor(storage, identity.current_actor_id())
    }

    pub fn for_actor(storage: S, actor: ActorId) -> Self {
        let bridge = PersistenceBridge::new(storage);
        let state = bridge.load_state(&actor);
        tracing::debug!(actor = %actor, lines = state.cart.lines().len(), "commerce store opened");
        Self { bridge, actor, state }
    }

    /// Releases the backing storage.
    pub fn into_storage(self) -> S { self.bridge.into_storage() }

    pub fn actor(&self) -> &ActorId { &self.actor }

    /// Replaces all in-memory state with what is stored for `actor`.
    pub fn switch_actor(&mut self, actor: ActorId) {
        if actor == self.actor { return; }
        tracing::info!(from = %self.actor, to = %actor, "switching actor");
        self.state = self.bridge.load_state(&actor);
        self.actor = actor;
    }

    /// Follows the resolver; returns true when the actor changed.
    pub fn sync_identity(&mut self, identity: &dyn IdentityResolver) -> bool {
        let actor = identity.current_actor_id();
        let changed = actor != self.actor;
        self.switch_actor(actor);
        changed
    }

    /// Re-reads the current actor's collections from storage, picking up
    /// writes made through another handle on the same backend.
    pub fn reload(&mut self) { self.state = self.bridge.load_state(&self.actor); }

    // --- cart ---------------------------------------------------------------

    pub fn cart(&self) -> &Cart { &self.state.cart }
    pub fn is_in_cart(&self, product_id: &str) -> bool { self.state.cart.contains(product_id) }
    pub fn cart_quantity(&self, product_id: &str) -> u32 { self.state.cart.get(product_id).map_or(0, |l| l.quantity) }

    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        if self.state.cart.add(product, quantity) {
            tracing::debug!(actor = %self.actor, product_id = %product.id, quantity, "added to cart");
            self.persist_cart();
        }
    }

    pub fn remove_from_cart(&mut self, product_id: &str) {
        if self.state.cart.remove(product_id) {
            tracing::debug!(actor = %self.actor, product_id, "removed from cart");
            self.persist_cart();
        }
    }

    /// Sets the quantity absolutely. Zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        if self.state.cart.update_quantity(product_id, quantity) {
            tracing::debug!(actor = %self.actor, product_id, quantity, "cart quantity updated");
            self.persist_cart();
        }
    }

    /// Empties the cart and drops any active promotion.
    pub fn clear_cart(&mut self) {
        self.state.cart.clear();
        self.state.promotion = PromotionState::default();
        tracing::debug!(actor = %self.actor, "cart cleared");
        self.persist_cart();
        self.persist_promotion();
    }

    pub fn save_for_later(&mut self, product_id: &str) {
        if self.state.cart.save_for_later(product_id) {
            self.persist_cart();
        }
    }

    pub fn move_to_cart(&mut self, product_id: &str) {
        if self.state.cart.move_to_cart(product_id) {
            self.persist_cart();
        }
    }

    /// Units across active lines; saved-for-later lines are excluded.
    pub fn get_total_items(&self) -> u64 { self.state.cart.total_items() }

    /// Active lines after per-product discounts, before the promotion.
    pub fn subtotal(&self) -> Decimal { self.state.cart.subtotal() }

    pub fn promotion_savings(&self) -> Decimal { money::mul(self.subtotal(), self.state.promotion.discount()) }

    /// Per-product and promotion discounts compose multiplicatively.
    /// Saturates at `Decimal::MAX` rather than overflowing.
    pub fn get_total_price(&self) -> Decimal {
        money::mul(self.subtotal(), Decimal::ONE - self.state.promotion.discount())
    }

    // --- promotion ----------------------------------------------------------

    pub fn promotion(&self) -> &PromotionState { &self.state.promotion }

    /// Replaces the active promotion on a known code; otherwise nothing changes.
    pub fn apply_promo_code(&mut self, code: &str) -> PromoOutcome {
        let Some(promotion) = PromotionState::for_code(code) else {
            tracing::info!(actor = %self.actor, code, "promotion code rejected");
            return PromoOutcome::Rejected { reason: PromoRejection::UnknownCode };
        };
        let outcome = PromoOutcome::Applied {
            code: promotion.code().unwrap_or_default().to_string(),
            discount: promotion.discount(),
        };
        tracing::info!(actor = %self.actor, code = ?promotion.code(), "promotion applied");
        self.state.promotion = promotion;
        self.persist_promotion();
        outcome
    }

    pub fn remove_promo_code(&mut self) {
        if self.state.promotion.is_active() {
            self.state.promotion = PromotionState::default();
            self.persist_promotion();
        }
    }

    // --- wishlist -----------------------------------------------------------

    pub fn wishlist(&self) -> &Wishlist { &self.state.wishlist }
    pub fn is_in_wishlist(&self, product_id: &str) -> bool { self.state.wishlist.contains(product_id) }

    pub fn add_to_wishlist(&mut self, product: &Product) {
        if self.state.wishlist.add(product, Utc::now()) {
            tracing::debug!(actor = %self.actor, product_id = %product.id, "added to wishlist");
            self.persist_wishlist();
        }
    }

    pub fn remove_from_wishlist(&mut self, product_id: &str) {
        if self.state.wishlist.remove(product_id) {
            self.persist_wishlist();
        }
    }

    /// Takes the entry off the wishlist and adds one unit to the cart.
    pub fn move_wishlist_to_cart(&mut self, product_id: &str) {
        if let Some(entry) = self.state.wishlist.take(product_id) {
            self.persist_wishlist();
            self.add_to_cart(&entry.product, 1);
        }
    }

    pub fn clear_wishlist(&mut self) {
        if self.state.wishlist.clear() {
            self.persist_wishlist();
        }
    }

    // --- recently viewed ----------------------------------------------------

    pub fn recently_viewed(&self) -> &RecentlyViewed { &self.state.recently_viewed }

    pub fn add_to_recently_viewed(&mut self, product: &Product) {
        self.state.recently_viewed.record(product);
        self.bridge.save(&self.actor, CollectionKind::RecentlyViewed, &self.state.recently_viewed);
    }

    pub fn clear_recently_viewed(&mut self) {
        if self.state.recently_viewed.clear() {
            self.bridge.save(&self.actor, CollectionKind::RecentlyViewed, &self.state.recently_viewed);
        }
    }

    // --- checkout -----------------------------------------------------------

    /// Simulated checkout. Consumes the active lines and the promotion;
    /// saved-for-later lines stay. `None` when nothing is active.
    pub fn checkout(&mut self, contact: CheckoutContact) -> Option<OrderConfirmation> {
        let active: Vec<CartLine> = self.state.cart.active_lines().cloned().collect();
        let order = OrderConfirmation::place(self.actor.clone(), contact, &active, &self.state.promotion).ok()?;
        self.state.cart.take_active();
        self.state.promotion = PromotionState::default();
        self.persist_cart();
        self.persist_promotion();
        tracing::info!(actor = %self.actor, order_id = %order.order_id, total = %order.total, "order placed");
        Some(order)
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            actor: self.actor.clone(),
            lines: self.state.cart.active_lines().cloned().collect(),
            saved_for_later: self.state.cart.saved_lines().cloned().collect(),
            total_items: self.get_total_items(),
            subtotal: self.subtotal().round_dp(2),
            promo_code: self.state.promotion.code().map(str::to_string),
            promo_discount: self.state.promotion.discount(),
            savings: self.promotion_savings().round_dp(2),
            total: self.get_total_price().round_dp(2),
        }
    }

    fn persist_cart(&self) { self.bridge.save(&self.actor, CollectionKind::Cart, &self.state.cart); }
    fn persist_wishlist(&self) { self.bridge.save(&self.actor, CollectionKind::Wishlist, &self.state.wishlist); }
    fn persist_promotion(&self) { self.bridge.save_promotion(&self.actor, &self.state.promotion); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionIdentity;
    use crate::persistence::MemoryStorage;
    use std::sync::Arc;

    fn store() -> CommerceStore<Arc<MemoryStorage>> {
        CommerceStore::for_actor(Arc::new(MemoryStorage::new()), ActorId::guest())
    }

    fn product(id: &str, price: i64) -> Product { Product::new(id, format!("Item {id}"), Decimal::new(price, 0)) }

    #[test]
    fn test_remove_is_idempotent() {
        let mut s = store();
        s.add_to_cart(&product("A", 5), 1);
        s.add_to_cart(&product("B", 5), 1);
        s.remove_from_cart("A");
        let after_first = s.cart().clone();
        s.remove_from_cart("A");
        assert_eq!(s.cart(), &after_first);
    }

    #[test]
    fn test_quantity_never_drops_below_one() {
        let mut s = store();
        s.add_to_cart(&product("A", 5), 3);
        for q in [2, 9, 1, 0, 4] {
            s.update_quantity("A", q);
            assert!(s.cart().get("A").map_or(true, |l| l.quantity >= 1));
        }
        assert!(!s.is_in_cart("A"));
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let mut s = store();
        for n in [1, 2, 3, 4] { s.add_to_cart(&product("A", 5), n); }
        assert_eq!(s.cart().lines().len(), 1);
        assert_eq!(s.cart_quantity("A"), 10);
    }

    #[test]
    fn test_saved_for_later_state_machine() {
        let mut s = store();
        s.add_to_cart(&product("A", 5), 3);
        s.add_to_cart(&product("B", 2), 1);
        s.save_for_later("A");
        assert_eq!(s.get_total_items(), 1);
        assert_eq!(s.get_total_price(), Decimal::new(2, 0));
        s.move_to_cart("A");
        assert_eq!(s.get_total_items(), 4);
        s.save_for_later("A");
        s.add_to_cart(&product("A", 5), 2);
        assert_eq!(s.cart_quantity("A"), 2);
        assert!(!s.cart().get("A").unwrap().is_saved_for_later());
    }

    #[test]
    fn test_total_derivation_with_promotion() {
        let mut s = store();
        s.add_to_cart(&product("A", 100).with_discount(10), 2);
        assert_eq!(s.get_total_price(), Decimal::new(180, 0));
        assert!(s.apply_promo_code("FREESHIP").is_applied());
        assert_eq!(s.get_total_price(), Decimal::new(153, 0));
        assert_eq!(s.promotion_savings(), Decimal::new(27, 0));
    }

    #[test]
    fn test_promo_round_trip() {
        let mut s = store();
        let outcome = s.apply_promo_code("  welcome10 ");
        assert_eq!(outcome, PromoOutcome::Applied { code: "WELCOME10".into(), discount: Decimal::new(10, 2) });
        let rejected = s.apply_promo_code("NOT-A-CODE");
        assert_eq!(rejected, PromoOutcome::Rejected { reason: PromoRejection::UnknownCode });
        assert_eq!(s.promotion().code(), Some("WELCOME10"));
        assert_eq!(s.promotion().discount(), Decimal::new(10, 2));
        s.apply_promo_code("special50");
        assert_eq!(s.promotion().discount(), Decimal::new(50, 2));
    }

    #[test]
    fn test_clear_cart_resets_promotion_only() {
        let mut s = store();
        s.add_to_cart(&product("A", 10), 1);
        s.add_to_wishlist(&product("W", 10));
        s.add_to_recently_viewed(&product("R", 10));
        s.apply_promo_code("FLASH25");
        s.clear_cart();
        assert!(s.cart().is_empty());
        assert!(!s.promotion().is_active());
        assert_eq!(s.promotion().discount(), Decimal::ZERO);
        assert!(s.is_in_wishlist("W"));
        assert_eq!(s.recently_viewed().len(), 1);
    }

    #[test]
    fn test_actor_isolation() {
        let mut s = store();
        s.add_to_cart(&product("A", 10), 2);
        s.apply_promo_code("SUMMER20");
        s.switch_actor(ActorId::new("user-42").unwrap());
        assert!(s.cart().is_empty());
        assert!(!s.promotion().is_active());
        s.add_to_cart(&product("B", 1), 1);
        s.switch_actor(ActorId::guest());
        assert_eq!(s.cart_quantity("A"), 2);
        assert!(!s.is_in_cart("B"));
        assert_eq!(s.promotion().code(), Some("SUMMER20"));
    }

    #[test]
    fn test_sync_identity_follows_session() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionIdentity::new();
        let mut s = CommerceStore::open(storage.clone(), &session);
        s.add_to_wishlist(&product("W", 3));
        assert!(!s.sync_identity(&session));
        session.login(ActorId::new("user-42").unwrap());
        assert!(s.sync_identity(&session));
        assert!(s.wishlist().is_empty());
        session.logout();
        assert!(s.sync_identity(&session));
        assert!(s.is_in_wishlist("W"));
    }

    #[test]
    fn test_state_survives_reopen() {
        let mut s = store();
        s.add_to_cart(&product("A", 10), 2);
        s.add_to_wishlist(&product("W", 3));
        s.add_to_recently_viewed(&product("R", 1));
        s.apply_promo_code("FLASH25");
        let reopened = CommerceStore::for_actor(s.into_storage(), ActorId::guest());
        assert_eq!(reopened.cart_quantity("A"), 2);
        assert!(reopened.is_in_wishlist("W"));
        assert_eq!(reopened.recently_viewed().products()[0].id, "R");
        assert_eq!(reopened.promotion().code(), Some("FLASH25"));
    }

    #[test]
    fn test_recently_viewed_cap_and_recency() {
        let mut s = store();
        for n in 0..11 { s.add_to_recently_viewed(&product(&format!("P{n}"), 1)); }
        let ids: Vec<_> = s.recently_viewed().products().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "P10");
        assert!(!ids.contains(&"P0".to_string()));
        s.add_to_recently_viewed(&product("P5", 1));
        assert_eq!(s.recently_viewed().len(), 10);
        assert_eq!(s.recently_viewed().products()[0].id, "P5");
    }

    #[test]
    fn test_wishlist_idempotence_and_move_to_cart() {
        let mut s = store();
        s.add_to_wishlist(&product("W", 8));
        let added = s.wishlist().entries()[0].date_added;
        s.add_to_wishlist(&product("W", 8));
        assert_eq!(s.wishlist().len(), 1);
        assert_eq!(s.wishlist().entries()[0].date_added, added);
        s.add_to_cart(&product("W", 8), 2);
        s.move_wishlist_to_cart("W");
        assert!(!s.is_in_wishlist("W"));
        assert_eq!(s.cart_quantity("W"), 3);
        s.move_wishlist_to_cart("missing");
        assert_eq!(s.cart().lines().len(), 1);
    }

    #[test]
    fn test_checkout_consumes_active_lines() {
        let mut s = store();
        let contact = CheckoutContact {
            name: "Ada".into(), email: "ada@example.com".into(), street: "1 Marina".into(),
            city: "Lagos".into(), zip: "101001".into(), country: "NG".into(), phone: None,
        };
        assert!(s.checkout(contact.clone()).is_none());
        s.add_to_cart(&product("A", 100).with_discount(10), 2);
        s.add_to_cart(&product("B", 7), 1);
        s.save_for_later("B");
        s.apply_promo_code("FREESHIP");
        let order = s.checkout(contact).unwrap();
        assert_eq!(order.total, Decimal::new(153, 0));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(s.get_total_items(), 0);
        assert!(s.is_in_cart("B"));
        assert!(!s.promotion().is_active());
    }

    #[test]
    fn test_reload_sees_writes_from_another_handle() {
        let storage = Arc::new(MemoryStorage::new());
        let mut first = CommerceStore::for_actor(storage.clone(), ActorId::guest());
        let mut second = CommerceStore::for_actor(storage, ActorId::guest());
        second.add_to_cart(&product("A", 4), 2);
        second.apply_promo_code("WELCOME10");
        assert!(first.cart().is_empty());
        first.reload();
        assert_eq!(first.cart_quantity("A"), 2);
        assert_eq!(first.promotion().code(), Some("WELCOME10"));
    }

    #[test]
    fn test_extreme_prices_saturate_instead_of_panicking() {
        let mut s = store();
        s.add_to_cart(&Product::new("BIG", "Big", Decimal::MAX), 2);
        s.add_to_cart(&product("A", 1), u32::MAX);
        assert_eq!(s.get_total_price(), Decimal::MAX);
        s.apply_promo_code("SPECIAL50");
        assert!(s.get_total_price() <= Decimal::MAX);
        assert!(s.promotion_savings() > Decimal::ZERO);

        let mut reopened = CommerceStore::for_actor(s.into_storage(), ActorId::guest());
        assert_eq!(reopened.subtotal(), Decimal::MAX);
        let summary = reopened.summary();
        assert_eq!(summary.subtotal, Decimal::MAX);
        let contact = CheckoutContact {
            name: "Ada".into(), email: "ada@example.com".into(), street: "1 Marina".into(),
            city: "Lagos".into(), zip: "101001".into(), country: "NG".into(), phone: None,
        };
        let order = reopened.checkout(contact).unwrap();
        assert_eq!(order.subtotal, Decimal::MAX);
        assert!(order.total <= order.subtotal);
    }

    #[test]
    fn test_summary_splits_saved_lines() {
        let mut s = store();
        s.add_to_cart(&product("A", 5), 1);
        s.add_to_cart(&product("B", 2), 3);
        s.save_for_later("B");
        let summary = s.summary();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].product_id(), "A");
        assert_eq!(summary.saved_for_later.len(), 1);
        assert_eq!(summary.saved_for_later[0].quantity, 3);
        assert_eq!(summary.total, Decimal::new(5, 0));
    }

    #[test]
    fn test_summary_rounds_for_display() {
        let mut s = store();
        s.add_to_cart(&Product::new("A", "Pen", Decimal::new(333, 2)).with_discount(33), 1);
        let summary = s.summary();
        assert_eq!(summary.total_items, 1);
        assert_eq!(summary.subtotal, Decimal::new(223, 2));
        assert_eq!(summary.total, summary.subtotal);
    }
}
