//! Domain models persisted by the external stores.

pub mod order;
pub mod product;

pub use order::{NewOrder, Order};
pub use product::Product;
