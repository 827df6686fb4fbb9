//! Hardware Shop Engine - Cart & order consistency engine.
//!
//! This crate owns the one place in the shop where real invariants must hold
//! under concurrent mutation: the in-memory shopping cart and its conversion
//! into a durable order. Everything around it - catalog persistence, order
//! persistence, authentication, presentation - is an external collaborator
//! reached through the traits in [`stores`].
//!
//! # Modules
//!
//! - [`cart`] - The [`CartAggregate`] line-item aggregate and its serialized
//!   session handle [`SessionCart`]
//! - [`stock`] - Pure validation of a cart against a catalog snapshot
//! - [`checkout`] - The [`CheckoutCoordinator`] driving the cart-to-order
//!   transition
//! - [`models`] - Product and order records
//! - [`stores`] - External collaborator traits plus in-memory implementations
//! - [`config`] - Engine configuration from environment variables
//!
//! # Guarantees
//!
//! - Line totals and cart totals are always derived, never stored.
//! - Every cart mutation is atomic with respect to the cart's invariants.
//! - Stock is re-validated against a fresh catalog read at commit time.
//! - At most one checkout is in flight per cart; a failed checkout leaves
//!   the cart exactly as it was.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod models;
pub mod stock;
pub mod stores;

pub use cart::{CartAggregate, CartError, CartSnapshot, LineItem, SessionCart};
pub use checkout::{CheckoutCoordinator, CheckoutError, CheckoutPhase};
pub use config::{ConfigError, EngineConfig};
pub use models::{NewOrder, Order, Product};
pub use stock::{CatalogSnapshot, StockError};
pub use stores::{
    CatalogSnapshotProvider, IdentityProvider, OrderStore, StoreError, UserIdentity,
};
