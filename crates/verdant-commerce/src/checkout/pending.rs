//! Pending-order stores.

use crate::checkout::{CheckoutOrder, PendingOrderStore};
use crate::error::CommerceError;
use crate::ids::OrderId;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Process-local pending orders.
#[derive(Debug, Default)]
pub struct MemoryPendingOrders {
    orders: Mutex<BTreeMap<OrderId, CheckoutOrder>>,
}

impl MemoryPendingOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingOrderStore for MemoryPendingOrders {
    async fn save(&self, order: &CheckoutOrder) -> Result<(), CommerceError> {
        self.orders
            .lock()
            .await
            .insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn load(&self, order_id: &OrderId) -> Result<Option<CheckoutOrder>, CommerceError> {
        Ok(self.orders.lock().await.get(order_id).cloned())
    }

    async fn delete(&self, order_id: &OrderId) -> Result<(), CommerceError> {
        self.orders.lock().await.remove(order_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CheckoutOrder>, CommerceError> {
        Ok(self.orders.lock().await.values().cloned().collect())
    }
}

#[cfg(feature = "storage")]
pub use cache_store::CachePendingOrders;

#[cfg(feature = "storage")]
mod cache_store {
    use super::*;
    use std::sync::Arc;
    use verdant_cache::{cache_key, Cache};

    const NAMESPACE: &str = "pending_order";

    /// Pending orders kept in a [`Cache`] under `pending_order:{id}`.
    #[derive(Clone)]
    pub struct CachePendingOrders {
        cache: Arc<Cache>,
    }

    impl CachePendingOrders {
        pub fn new(cache: Arc<Cache>) -> Self {
            Self { cache }
        }
    }

    #[async_trait]
    impl PendingOrderStore for CachePendingOrders {
        async fn save(&self, order: &CheckoutOrder) -> Result<(), CommerceError> {
            self.cache.set(&cache_key!(NAMESPACE, order.order_id), order)?;
            Ok(())
        }

        async fn load(&self, order_id: &OrderId) -> Result<Option<CheckoutOrder>, CommerceError> {
            Ok(self.cache.get(&cache_key!(NAMESPACE, order_id))?)
        }

        async fn delete(&self, order_id: &OrderId) -> Result<(), CommerceError> {
            self.cache.delete(&cache_key!(NAMESPACE, order_id))?;
            Ok(())
        }

        async fn list(&self) -> Result<Vec<CheckoutOrder>, CommerceError> {
            let prefix = format!("{NAMESPACE}:");
            let mut orders = Vec::new();
            for key in self.cache.keys_with_prefix(&prefix)? {
                if let Some(order) = self.cache.get::<CheckoutOrder>(&key)? {
                    orders.push(order);
                }
            }
            orders.sort_by(|a, b| a.placed_at.cmp(&b.placed_at));
            Ok(orders)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CustomerInfo, PaymentProvider};
    use crate::money::Money;
    use chrono::Utc;

    fn order(id: &str) -> CheckoutOrder {
        CheckoutOrder {
            order_id: OrderId::new(id),
            payment_id: None,
            provider: PaymentProvider::WalletRedirect,
            items: Vec::new(),
            subtotal: Money::inr(0),
            tax: Money::inr(0),
            cod_charges: None,
            discount: Money::inr(0),
            total: Money::inr(0),
            customer: CustomerInfo::default(),
            coupon_code: None,
            placed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemoryPendingOrders::new();
        store.save(&order("ORD-1")).await.unwrap();
        store.save(&order("ORD-2")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        let loaded = store.load(&OrderId::new("ORD-1")).await.unwrap();
        assert_eq!(loaded.unwrap().order_id.as_str(), "ORD-1");

        store.delete(&OrderId::new("ORD-1")).await.unwrap();
        assert!(store.load(&OrderId::new("ORD-1")).await.unwrap().is_none());
    }

    #[cfg(feature = "storage")]
    #[tokio::test]
    async fn test_cache_store_lists_oldest_first() {
        use std::sync::Arc;
        use verdant_cache::Cache;

        let cache = Arc::new(Cache::in_memory());
        let store = CachePendingOrders::new(cache.clone());
        let mut later = order("ORD-B");
        later.placed_at = Utc::now() + chrono::Duration::minutes(5);
        store.save(&later).await.unwrap();
        store.save(&order("ORD-A")).await.unwrap();
        cache.set("order:ORD-C", &order("ORD-C")).unwrap();

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.order_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["ORD-A", "ORD-B"]);

        store.delete(&OrderId::new("ORD-A")).await.unwrap();
        assert!(store.load(&OrderId::new("ORD-A")).await.unwrap().is_none());
    }
}
