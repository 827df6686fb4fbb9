//! In-memory shopping cart aggregate.
//!
//! A cart is transient, session-scoped state: created empty at session start,
//! mutated by add/update/remove, and cleared atomically on a successful
//! checkout. It is never persisted remotely. [`CartAggregate`] is the plain
//! bookkeeping structure; [`SessionCart`] is the handle shared across the
//! screens of one session, serializing every operation on an internal mutex
//! so concurrent quantity edits cannot interleave into lost updates.
//!
//! The aggregate deliberately never checks stock. Stock is advisory at
//! add-to-cart time (checked by the caller against whatever catalog read it
//! has) and authoritative only at checkout, where the coordinator re-reads
//! the catalog.

use std::sync::Arc;

use hardware_shop_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors returned by cart mutations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CartError {
    /// A zero quantity was supplied where at least one unit is required.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// One product entry in a cart or order.
///
/// The line total is always derived from `unit_price` and `quantity` via
/// [`LineItem::line_total`]; it is never stored, so it cannot go stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub unit: String,
    /// Always >= 1 while the line is present; a would-be zero line is
    /// removed instead of stored.
    pub quantity: u32,
}

impl LineItem {
    /// The derived total for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// Immutable, deeply-copied view of a cart for observers.
///
/// Mutations to the live cart after a snapshot is taken are not visible
/// through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Lines in insertion order.
    pub lines: Vec<LineItem>,
    /// Sum of line totals.
    pub total: Decimal,
    /// Sum of quantities across lines - the "Cart (N)" badge counts units,
    /// not distinct lines.
    pub item_count: u32,
}

impl CartSnapshot {
    /// An empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }

    /// Whether the snapshot holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Insertion-ordered aggregate of cart lines, keyed by product id.
///
/// Invariants, upheld by every operation:
/// - no two lines share a `product_id`
/// - every line has `quantity >= 1`
/// - totals and item counts are derived on demand, never cached
#[derive(Debug, Default)]
pub struct CartAggregate {
    lines: Vec<LineItem>,
}

impl CartAggregate {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Insert a new line, or increment the existing line's quantity if the
    /// product is already in the cart. Two adds of the same product always
    /// merge into one line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero; the
    /// cart is left untouched.
    pub fn add_or_increment(
        &mut self,
        product_id: ProductId,
        name: &str,
        unit_price: Price,
        unit: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if let Some(line) = self.line_mut(&product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(LineItem {
                product_id,
                name: name.to_owned(),
                unit_price,
                unit: unit.to_owned(),
                quantity,
            });
        }
        Ok(())
    }

    /// Set a line to an exact quantity (not additive).
    ///
    /// A quantity of zero removes the line entirely - the "remove via zero"
    /// convention from the quantity steppers in the cart screen. Absent
    /// products are ignored, so the operation is idempotent.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
    }

    /// Remove the line for `product_id` if present; idempotent.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    /// Remove all lines.
    ///
    /// Used by the checkout coordinator on confirmed success, or by an
    /// explicit "empty cart" action.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Take an immutable, deeply-copied view of the cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            total: self.total(),
            item_count: self.item_count(),
        }
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut LineItem> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

/// Handle to one session's cart, cloneable across screens.
///
/// All access goes through these methods, which acquire the cart's mutex for
/// the duration of the operation. Callers only ever receive copied
/// [`CartSnapshot`]s, never references into the live cart. Mutating methods
/// return the post-operation snapshot so the UI can re-render without a
/// second lock acquisition.
#[derive(Debug, Clone, Default)]
pub struct SessionCart {
    inner: Arc<Mutex<CartAggregate>>,
}

impl SessionCart {
    /// Create a handle to a fresh, empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`CartAggregate::add_or_increment`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero.
    pub async fn add_or_increment(
        &self,
        product_id: ProductId,
        name: &str,
        unit_price: Price,
        unit: &str,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        let mut cart = self.inner.lock().await;
        cart.add_or_increment(product_id, name, unit_price, unit, quantity)?;
        Ok(cart.snapshot())
    }

    /// See [`CartAggregate::set_quantity`].
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> CartSnapshot {
        let mut cart = self.inner.lock().await;
        cart.set_quantity(product_id, quantity);
        cart.snapshot()
    }

    /// See [`CartAggregate::remove`].
    pub async fn remove(&self, product_id: &ProductId) -> CartSnapshot {
        let mut cart = self.inner.lock().await;
        cart.remove(product_id);
        cart.snapshot()
    }

    /// See [`CartAggregate::clear`].
    pub async fn clear(&self) -> CartSnapshot {
        let mut cart = self.inner.lock().await;
        cart.clear();
        cart.snapshot()
    }

    /// Take a snapshot of the current cart state.
    pub async fn snapshot(&self) -> CartSnapshot {
        self.inner.lock().await.snapshot()
    }
}
