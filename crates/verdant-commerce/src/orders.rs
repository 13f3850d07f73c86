//! Confirmed order records and admin access to them.

use crate::checkout::{CheckoutOrder, OrderConfirmation};
use crate::error::CommerceError;
use crate::ids::OrderId;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Authorization check supplied by an auth collaborator.
///
/// Holders answer one question; credentials never reach this crate.
pub trait AdminCapability: Send + Sync {
    fn is_authorized(&self) -> bool;
}

/// Capability that never authorizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl AdminCapability for Anonymous {
    fn is_authorized(&self) -> bool {
        false
    }
}

/// Settled orders in placement order.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: RwLock<Vec<CheckoutOrder>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding previously settled orders, oldest first.
    pub fn from_orders(mut orders: Vec<CheckoutOrder>) -> Self {
        orders.sort_by(|a, b| a.placed_at.cmp(&b.placed_at));
        Self {
            orders: RwLock::new(orders),
        }
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// All orders, for an authorized admin.
    pub async fn list(&self, admin: &dyn AdminCapability) -> Result<Vec<CheckoutOrder>, CommerceError> {
        if !admin.is_authorized() {
            return Err(CommerceError::Unauthorized);
        }
        Ok(self.orders.read().await.clone())
    }

    /// One order, for an authorized admin.
    pub async fn get(
        &self,
        admin: &dyn AdminCapability,
        order_id: &OrderId,
    ) -> Result<CheckoutOrder, CommerceError> {
        if !admin.is_authorized() {
            return Err(CommerceError::Unauthorized);
        }
        self.orders
            .read()
            .await
            .iter()
            .find(|o| &o.order_id == order_id)
            .cloned()
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.clone()))
    }
}

#[async_trait]
impl OrderConfirmation for OrderBook {
    async fn confirm(&self, order: &CheckoutOrder) {
        debug!(order_id = %order.order_id, "order recorded");
        self.orders.write().await.push(order.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CustomerInfo, PaymentProvider};
    use crate::money::Money;
    use chrono::Utc;

    struct Admin;

    impl AdminCapability for Admin {
        fn is_authorized(&self) -> bool {
            true
        }
    }

    fn order(id: &str) -> CheckoutOrder {
        CheckoutOrder {
            order_id: OrderId::new(id),
            payment_id: None,
            provider: PaymentProvider::CashOnDelivery,
            items: Vec::new(),
            subtotal: Money::inr(0),
            tax: Money::inr(0),
            cod_charges: Some(Money::inr(50)),
            discount: Money::inr(0),
            total: Money::inr(50),
            customer: CustomerInfo::default(),
            coupon_code: None,
            placed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_listing_requires_capability() {
        let book = OrderBook::new();
        book.confirm(&order("ORD-1")).await;

        assert!(matches!(book.list(&Anonymous).await, Err(CommerceError::Unauthorized)));
        assert_eq!(book.list(&Admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let book = OrderBook::new();
        let result = book.get(&Admin, &OrderId::new("ORD-404")).await;
        assert!(matches!(result, Err(CommerceError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_from_orders_sorts_by_placement() {
        let mut first = order("ORD-1");
        first.placed_at = Utc::now() - chrono::Duration::hours(1);
        let book = OrderBook::from_orders(vec![order("ORD-2"), first]);

        let ids: Vec<String> = book
            .list(&Admin)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.order_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["ORD-1", "ORD-2"]);
        assert!(book.get(&Anonymous, &OrderId::new("ORD-1")).await.is_err());
    }
}
