//! Order (bill) records.
//!
//! An order is the immutable outcome of a successful checkout. Its lines are
//! deep copies of the cart at the moment of commit, and `total_amount` is
//! computed once at creation - later catalog price changes never alter a past
//! order. The only mutation an order ever sees is the owner-side
//! `Pending -> Completed` status transition.

use chrono::{DateTime, Utc};
use hardware_shop_core::{OrderId, OrderStatus, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;

/// An order built by checkout, before the store has assigned it an id.
///
/// Constructed exactly once per successful checkout by the
/// [`CheckoutCoordinator`](crate::checkout::CheckoutCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub user_display_name: String,
    /// Line snapshots copied from the cart at commit time.
    pub lines: Vec<LineItem>,
    /// Sum of line totals at creation time; never recomputed.
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Attach the store-assigned id, producing the durable [`Order`].
    #[must_use]
    pub fn into_order(self, order_id: OrderId) -> Order {
        Order {
            order_id,
            user_id: self.user_id,
            user_display_name: self.user_display_name,
            lines: self.lines,
            total_amount: self.total_amount,
            created_at: self.created_at,
            status: self.status,
        }
    }
}

/// A durable order as read back from the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub user_display_name: String,
    pub lines: Vec<LineItem>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hardware_shop_core::{Price, ProductId};
    use rust_decimal::Decimal;

    fn sample_new_order() -> NewOrder {
        NewOrder {
            user_id: UserId::new("u-1"),
            user_display_name: "Asha".to_owned(),
            lines: vec![LineItem {
                product_id: ProductId::new("prod-1"),
                name: "M6 bolt".to_owned(),
                unit_price: Price::new(Decimal::new(250, 2)).unwrap(),
                unit: "piece".to_owned(),
                quantity: 4,
            }],
            total_amount: Decimal::new(1000, 2),
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn test_into_order_preserves_fields() {
        let new_order = sample_new_order();
        let order = new_order.clone().into_order(OrderId::new("ord-1"));

        assert_eq!(order.order_id, OrderId::new("ord-1"));
        assert_eq!(order.user_id, new_order.user_id);
        assert_eq!(order.lines, new_order.lines);
        assert_eq!(order.total_amount, new_order.total_amount);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_serde_round_trip() {
        let order = sample_new_order().into_order(OrderId::new("ord-2"));
        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order);
    }
}
