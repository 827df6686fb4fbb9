//! Catalog product records.

use hardware_shop_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// A product as read from the catalog store.
///
/// Products are owned and mutated exclusively by the owner-side management
/// path; this engine only ever reads them. `stock_quantity` is authoritative
/// at the moment of a read and nothing more - stock may change between any
/// two reads, which is why checkout re-reads the catalog at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    /// Unit of sale as shown to the customer (e.g., "kg", "piece", "box").
    pub unit: String,
    pub stock_quantity: u32,
    pub description: String,
    pub category: String,
}
