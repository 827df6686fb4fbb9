//! Pure stock validation of a cart against a catalog snapshot.
//!
//! Validation is all-or-nothing: checkout never commits a subset of lines,
//! so the first offending line (in cart insertion order) fails the whole
//! pass. The function has no side effects and touches no I/O - the
//! coordinator is responsible for assembling a fresh [`CatalogSnapshot`]
//! before calling it.

use std::collections::HashMap;

use hardware_shop_core::ProductId;
use thiserror::Error;

use crate::cart::CartSnapshot;
use crate::models::Product;

/// Reasons a cart fails stock validation.
///
/// Both variants carry enough detail for the UI to say something specific
/// ("only 3 left") instead of a generic failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// The product no longer exists in the catalog.
    #[error("product {product_id} is no longer available")]
    ProductUnavailable { product_id: ProductId },

    /// The cart requests more units than the catalog has.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
}

/// Point-in-time view of the catalog rows relevant to one validation pass.
///
/// A snapshot is built from a single batch of catalog reads and carries no
/// freshness guarantee beyond that read, which is exactly why checkout
/// builds a new one at commit time instead of reusing one from earlier in
/// the session.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    products: HashMap<ProductId, Product>,
}

impl CatalogSnapshot {
    /// Build a snapshot from product records.
    #[must_use]
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.product_id.clone(), product))
                .collect(),
        }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.get(product_id)
    }
}

/// Validate every cart line against the catalog snapshot.
///
/// # Errors
///
/// Returns the error for the first offending line in cart iteration order:
/// [`StockError::ProductUnavailable`] if the product is missing from the
/// snapshot, [`StockError::InsufficientStock`] if the requested quantity
/// exceeds available stock.
pub fn validate(cart: &CartSnapshot, catalog: &CatalogSnapshot) -> Result<(), StockError> {
    for line in &cart.lines {
        let Some(product) = catalog.get(&line.product_id) else {
            return Err(StockError::ProductUnavailable {
                product_id: line.product_id.clone(),
            });
        };
        if line.quantity > product.stock_quantity {
            return Err(StockError::InsufficientStock {
                product_id: line.product_id.clone(),
                requested: line.quantity,
                available: product.stock_quantity,
            });
        }
    }
    Ok(())
}
