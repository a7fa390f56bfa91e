//! Aggregates module
pub mod cart;
pub mod history;
pub mod order;
pub mod wishlist;

pub use cart::{Cart, CartLine, LineStatus};
pub use history::{RecentlyViewed, RECENTLY_VIEWED_LIMIT};
pub use order::{CheckoutContact, OrderConfirmation};
pub use wishlist::{Wishlist, WishlistEntry};
