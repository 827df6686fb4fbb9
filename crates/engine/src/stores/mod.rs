//! Traits for the engine's external collaborators.
//!
//! The engine never talks to a concrete database or auth provider. It reads
//! product records through [`CatalogSnapshotProvider`], writes finalized
//! orders through [`OrderStore`], and consumes the acting user's identity
//! through [`IdentityProvider`]. The remote document database behind these
//! traits is someone else's concern; so are its wire formats.
//!
//! Async trait methods are declared as `impl Future + Send` so the checkout
//! future stays spawnable on a multi-threaded runtime.

use std::future::Future;

use hardware_shop_core::{OrderId, OrderStatus, ProductId, UserId};
use thiserror::Error;

use crate::models::{NewOrder, Order, Product};

pub mod memory;

pub use memory::{InMemoryCatalog, InMemoryOrderStore, StaticIdentity};

/// Errors surfaced by store implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or the operation failed (connectivity,
    /// backend outage). Recoverable; the caller may retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// The requested status change violates the order lifecycle.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}

/// Read access to authoritative product records.
///
/// Every read returns price and stock as of that read and nothing more; the
/// engine never assumes two reads agree.
pub trait CatalogSnapshotProvider {
    /// Fetch one product, or `None` if it does not exist.
    fn get_product(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<Option<Product>, StoreError>> + Send;

    /// List products, optionally filtered by category, ordered by name
    /// ascending.
    fn list_products(
        &self,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;
}

/// Durable persistence of finalized orders.
pub trait OrderStore {
    /// Append a finalized order and return the store-assigned id.
    fn append(&self, order: NewOrder) -> impl Future<Output = Result<OrderId, StoreError>> + Send;

    /// Orders placed by `user_id`, newest first.
    fn list_by_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// All orders across users, newest first (owner-side review).
    fn list_all(&self) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Apply an order status transition.
    ///
    /// Implementations must reject any transition that
    /// [`OrderStatus::can_transition_to`] denies with
    /// [`StoreError::InvalidStatusTransition`].
    fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The signed-in user as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub display_name: String,
}

/// Supplies the acting user's identity.
///
/// The engine only consumes an identifier and display name; authentication
/// itself happens elsewhere.
pub trait IdentityProvider {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserIdentity>;
}
