//! Integration tests for Hardware Shop.
//!
//! These tests wire the full engine - session cart, stock validation, and
//! checkout coordination - to the in-memory store implementations and drive
//! it through the same sequences the customer and owner screens would.
//!
//! # Test Categories
//!
//! - `checkout_flow` - End-to-end cart-to-order transitions
//! - `order_status` - Owner-side order review and status lifecycle
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hardware-shop-integration-tests
//! ```

use std::sync::{Arc, Once};

use hardware_shop_core::{Price, ProductId};
use hardware_shop_engine::{
    CartSnapshot, CheckoutCoordinator, EngineConfig, Product, SessionCart,
    stores::{InMemoryCatalog, InMemoryOrderStore, StaticIdentity},
};
use rust_decimal::Decimal;

/// The user every context signs in as unless overridden.
pub const TEST_USER_ID: &str = "u-test";
/// Display name for [`TEST_USER_ID`].
pub const TEST_USER_NAME: &str = "Asha Verma";

static TRACING: Once = Once::new();

/// Install a tracing subscriber once for the whole test binary.
///
/// Honors `RUST_LOG`; defaults to silence so test output stays readable.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A fully wired engine over in-memory stores.
pub struct TestContext {
    pub cart: SessionCart,
    pub catalog: Arc<InMemoryCatalog>,
    pub orders: Arc<InMemoryOrderStore>,
    pub coordinator: CheckoutCoordinator<InMemoryCatalog, InMemoryOrderStore, StaticIdentity>,
}

impl TestContext {
    /// A context with the given catalog, a signed-in test user, an empty
    /// order store, and default configuration.
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self::build(
            products,
            InMemoryOrderStore::new(),
            StaticIdentity::signed_in(TEST_USER_ID, TEST_USER_NAME),
            EngineConfig::default(),
        )
    }

    /// A context with full control over the collaborators.
    #[must_use]
    pub fn build(
        products: impl IntoIterator<Item = Product>,
        orders: InMemoryOrderStore,
        identity: StaticIdentity,
        config: EngineConfig,
    ) -> Self {
        init_tracing();
        let cart = SessionCart::new();
        let catalog = Arc::new(InMemoryCatalog::new(products));
        let orders = Arc::new(orders);
        let coordinator = CheckoutCoordinator::new(
            cart.clone(),
            Arc::clone(&catalog),
            Arc::clone(&orders),
            Arc::new(identity),
            config,
        );
        Self {
            cart,
            catalog,
            orders,
            coordinator,
        }
    }

    /// Add `quantity` units of a catalog product to the cart, the way the
    /// product screen does it.
    ///
    /// # Panics
    ///
    /// Panics if the quantity is rejected; tests exercising rejection call
    /// the cart directly.
    pub async fn add_to_cart(&self, product: &Product, quantity: u32) -> CartSnapshot {
        self.cart
            .add_or_increment(
                product.product_id.clone(),
                &product.name,
                product.unit_price,
                &product.unit,
                quantity,
            )
            .await
            .expect("add_to_cart with a positive quantity")
    }
}

/// A catalog product with the given price (in paise) and stock.
#[must_use]
pub fn product(id: &str, name: &str, price_paise: i64, stock_quantity: u32) -> Product {
    Product {
        product_id: ProductId::new(id),
        name: name.to_owned(),
        unit_price: Price::new(Decimal::new(price_paise, 2)).expect("non-negative test price"),
        unit: "piece".to_owned(),
        stock_quantity,
        description: format!("{name} (test fixture)"),
        category: "hardware".to_owned(),
    }
}
