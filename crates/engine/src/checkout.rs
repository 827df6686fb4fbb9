//! Cart-to-order checkout coordination.
//!
//! Checkout drives the only state transition in the shop that must never
//! happen twice or halfway: converting a cart into a durable order. The
//! coordinator moves through `Idle -> Validating -> Committing` and ends in
//! either `Committed` (order appended, cart cleared) or `Rejected` (cart
//! untouched, caller receives the specific reason).
//!
//! Two rules shape the implementation:
//!
//! - The cart mutex is never held across I/O. The coordinator snapshots the
//!   cart, releases the lock, performs the catalog read and store write, and
//!   re-acquires the lock only to clear the cart on confirmed success.
//! - At most one checkout is in flight per cart. The phase cell doubles as
//!   the guard: a second `checkout` call while one is running is rejected
//!   with [`CheckoutError::CheckoutInProgress`] instead of interleaved.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Utc;
use hardware_shop_core::{OrderId, OrderStatus};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::cart::{CartSnapshot, SessionCart};
use crate::config::EngineConfig;
use crate::models::NewOrder;
use crate::stock::{self, CatalogSnapshot, StockError};
use crate::stores::{CatalogSnapshotProvider, IdentityProvider, OrderStore, StoreError};

/// Reasons a checkout is rejected.
///
/// All variants are recoverable; a rejected checkout leaves the cart exactly
/// as it was.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines (or a zero total).
    #[error("cart is empty")]
    EmptyCart,

    /// Another checkout on this cart is already validating or committing.
    #[error("a checkout is already in progress")]
    CheckoutInProgress,

    /// No signed-in user to bill the order to.
    #[error("no signed-in user")]
    NotAuthenticated,

    /// Stock validation failed for a cart line.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The catalog or order store could not complete an operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// A catalog read or order write exceeded the configured deadline.
    #[error("checkout timed out")]
    Timeout,
}

impl CheckoutError {
    /// The message shown to the customer for this rejection.
    ///
    /// Kept specific on purpose: "only 3 left" beats a generic failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Cannot generate bill - cart is empty".to_owned(),
            Self::CheckoutInProgress => {
                "Your order is already being placed, hold on".to_owned()
            }
            Self::NotAuthenticated => "Please sign in to place an order".to_owned(),
            Self::Stock(StockError::ProductUnavailable { .. }) => {
                "An item in your cart is no longer available".to_owned()
            }
            Self::Stock(StockError::InsufficientStock { available, .. }) => {
                format!("Only {available} left in stock")
            }
            Self::StoreUnavailable(_) => {
                "Could not save your order, please try again".to_owned()
            }
            Self::Timeout => "Checkout timed out, please try again".to_owned(),
        }
    }
}

/// Observable checkout phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Validating,
    Committing,
}

const PHASE_IDLE: u8 = 0;
const PHASE_VALIDATING: u8 = 1;
const PHASE_COMMITTING: u8 = 2;

impl CheckoutPhase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            PHASE_VALIDATING => Self::Validating,
            PHASE_COMMITTING => Self::Committing,
            _ => Self::Idle,
        }
    }
}

/// Resets the phase cell to `Idle` when a checkout attempt ends, however it
/// ends.
struct PhaseGuard {
    phase: Arc<AtomicU8>,
}

impl PhaseGuard {
    fn set(&self, phase: u8) {
        self.phase.store(phase, Ordering::SeqCst);
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.phase.store(PHASE_IDLE, Ordering::SeqCst);
    }
}

/// Drives the cart-to-order transition for one session's cart.
pub struct CheckoutCoordinator<C, O, I> {
    cart: SessionCart,
    catalog: Arc<C>,
    orders: Arc<O>,
    identity: Arc<I>,
    config: EngineConfig,
    phase: Arc<AtomicU8>,
}

impl<C, O, I> CheckoutCoordinator<C, O, I>
where
    C: CatalogSnapshotProvider,
    O: OrderStore,
    I: IdentityProvider,
{
    /// Create a coordinator over the given cart and collaborators.
    pub fn new(
        cart: SessionCart,
        catalog: Arc<C>,
        orders: Arc<O>,
        identity: Arc<I>,
        config: EngineConfig,
    ) -> Self {
        Self {
            cart,
            catalog,
            orders,
            identity,
            config,
            phase: Arc::new(AtomicU8::new(PHASE_IDLE)),
        }
    }

    /// The current checkout phase.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        CheckoutPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Convert the cart into a durable order.
    ///
    /// On success the order id assigned by the store is returned and the
    /// cart has been cleared. On any rejection the cart is exactly as it
    /// was: same lines, same total.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`] for the full taxonomy.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<OrderId, CheckoutError> {
        // Entry condition, checked without leaving Idle.
        let entry = self.cart.snapshot().await;
        if entry.is_empty() || entry.total <= Decimal::ZERO {
            debug!("rejecting checkout of empty cart");
            return Err(CheckoutError::EmptyCart);
        }

        let guard = self.begin()?;

        // The snapshot used for validation and the order itself. Taken after
        // the guard so a line edited in between still makes it in; never
        // re-read afterward, so a line added mid-commit cannot slip into the
        // order.
        let snapshot = self.cart.snapshot().await;
        if snapshot.is_empty() || snapshot.total <= Decimal::ZERO {
            // Emptied between the entry check and the guard.
            return Err(CheckoutError::EmptyCart);
        }

        let user = self
            .identity
            .current_user()
            .ok_or(CheckoutError::NotAuthenticated)?;

        let catalog = self.read_catalog(&snapshot).await?;
        stock::validate(&snapshot, &catalog)?;

        guard.set(PHASE_COMMITTING);
        debug!(lines = snapshot.lines.len(), total = %snapshot.total, "stock validated, committing");

        let order = NewOrder {
            user_id: user.user_id,
            user_display_name: user.display_name,
            lines: snapshot.lines.clone(),
            total_amount: snapshot.total,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        };

        let order_id = match timeout(self.config.checkout_timeout, self.orders.append(order)).await
        {
            Err(_) => {
                warn!("order append exceeded deadline, cart left untouched");
                return Err(CheckoutError::Timeout);
            }
            Ok(Err(err)) => {
                warn!(error = %err, "order append failed, cart left untouched");
                return Err(CheckoutError::StoreUnavailable(err));
            }
            Ok(Ok(order_id)) => order_id,
        };

        // Only now, with the order confirmed durable, is the cart touched.
        self.cart.clear().await;
        info!(order_id = %order_id, total = %snapshot.total, "checkout committed");
        Ok(order_id)
    }

    /// Transition `Idle -> Validating`, or reject if a checkout is already
    /// running.
    fn begin(&self) -> Result<PhaseGuard, CheckoutError> {
        self.phase
            .compare_exchange(
                PHASE_IDLE,
                PHASE_VALIDATING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|_| CheckoutError::CheckoutInProgress)?;
        Ok(PhaseGuard {
            phase: Arc::clone(&self.phase),
        })
    }

    /// Take a fresh catalog read for every line in the snapshot.
    ///
    /// Products missing from the catalog are simply absent from the result;
    /// the validator turns that into `ProductUnavailable` so the error
    /// carries the offending line in cart order.
    async fn read_catalog(
        &self,
        snapshot: &CartSnapshot,
    ) -> Result<CatalogSnapshot, CheckoutError> {
        let mut products = Vec::with_capacity(snapshot.lines.len());
        for line in &snapshot.lines {
            let read = timeout(
                self.config.checkout_timeout,
                self.catalog.get_product(&line.product_id),
            )
            .await;
            match read {
                Err(_) => {
                    warn!(product_id = %line.product_id, "catalog read exceeded deadline");
                    return Err(CheckoutError::Timeout);
                }
                Ok(Err(err)) => {
                    warn!(product_id = %line.product_id, error = %err, "catalog read failed");
                    return Err(CheckoutError::StoreUnavailable(err));
                }
                Ok(Ok(Some(product))) => products.push(product),
                Ok(Ok(None)) => {}
            }
        }
        Ok(CatalogSnapshot::from_products(products))
    }
}
