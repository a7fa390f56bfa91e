//! Storefront domain: catalog snapshots, cart, wishlist, history and promotions
pub mod aggregates;
pub mod catalog;
pub mod promotion;
pub mod value_objects;
