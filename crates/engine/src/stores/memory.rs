//! In-memory store implementations.
//!
//! These stand in for the remote document database in tests and local
//! development. [`InMemoryOrderStore`] supports injectable append latency and
//! one-shot append failure so checkout's rejection and in-flight-guard paths
//! can be exercised deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hardware_shop_core::{OrderId, OrderStatus, ProductId, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewOrder, Order, Product};
use crate::stores::{
    CatalogSnapshotProvider, IdentityProvider, OrderStore, StoreError, UserIdentity,
};

/// In-memory catalog of products.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalog {
    /// Build a catalog from product records.
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(
                products
                    .into_iter()
                    .map(|product| (product.product_id.clone(), product))
                    .collect(),
            ),
        }
    }

    /// Insert or replace a product, as the owner-side catalog CRUD would.
    pub async fn add_product(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.product_id.clone(), product);
    }

    /// Overwrite a product's stock level, simulating a concurrent owner-side
    /// stock edit between two catalog reads.
    pub async fn set_stock(&self, product_id: &ProductId, stock_quantity: u32) {
        if let Some(product) = self.products.write().await.get_mut(product_id) {
            product.stock_quantity = stock_quantity;
        }
    }

    /// Delete a product, simulating removal from the catalog mid-session.
    pub async fn remove_product(&self, product_id: &ProductId) {
        self.products.write().await.remove(product_id);
    }
}

impl CatalogSnapshotProvider for InMemoryCatalog {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(product_id).cloned())
    }

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products
            .values()
            .filter(|product| category.is_none_or(|c| product.category == c))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }
}

/// In-memory order store.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    append_latency: Duration,
    fail_next_append: AtomicBool,
}

impl InMemoryOrderStore {
    /// An empty store with no artificial latency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store whose `append` sleeps for `latency` first, leaving a
    /// window in which a second checkout can be observed overlapping.
    #[must_use]
    pub fn with_append_latency(latency: Duration) -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            append_latency: latency,
            fail_next_append: AtomicBool::new(false),
        }
    }

    /// Make the next `append` fail with [`StoreError::Unavailable`].
    pub fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }

    /// All stored orders, in append order (test inspection).
    pub async fn stored_orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Whether no orders are stored.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

impl OrderStore for InMemoryOrderStore {
    async fn append(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        if !self.append_latency.is_zero() {
            tokio::time::sleep(self.append_latency).await;
        }
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected append failure".to_owned(),
            ));
        }
        let order_id = OrderId::new(Uuid::new_v4().to_string());
        self.orders
            .write()
            .await
            .push(order.into_order(order_id.clone()));
        Ok(order_id)
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut listed: Vec<Order> = orders
            .iter()
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let mut listed = self.orders.read().await.clone();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.iter_mut().find(|order| &order.order_id == order_id) else {
            return Err(StoreError::NotFound);
        };
        if !order.status.can_transition_to(status) {
            return Err(StoreError::InvalidStatusTransition {
                from: order.status,
                to: status,
            });
        }
        order.status = status;
        Ok(())
    }
}

/// Identity provider returning a fixed user (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<UserIdentity>,
}

impl StaticIdentity {
    /// A provider with a signed-in user.
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user: Some(UserIdentity {
                user_id: UserId::new(user_id),
                display_name: display_name.into(),
            }),
        }
    }

    /// A provider with no signed-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}
