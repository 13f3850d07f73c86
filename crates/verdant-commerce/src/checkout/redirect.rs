//! Out-of-band confirmation of wallet-redirect orders.

use crate::cart::SharedCart;
use crate::checkout::flow::settle;
use crate::checkout::{CheckoutOrder, OrderConfirmation, PendingOrderStore};
use crate::error::CheckoutError;
use crate::ids::{OrderId, PaymentId};
use crate::orders::AdminCapability;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Handles the customer's return from a wallet page.
///
/// Each pending order settles at most once: the snapshot is taken out of the
/// store before the cart is cleared, and concurrent returns are serialized.
pub struct RedirectReturn {
    cart: SharedCart,
    pending: Arc<dyn PendingOrderStore>,
    confirmation: Arc<dyn OrderConfirmation>,
    serial: Mutex<()>,
}

impl RedirectReturn {
    pub fn new(
        cart: SharedCart,
        pending: Arc<dyn PendingOrderStore>,
        confirmation: Arc<dyn OrderConfirmation>,
    ) -> Self {
        Self {
            cart,
            pending,
            confirmation,
            serial: Mutex::new(()),
        }
    }

    async fn take(&self, order_id: &OrderId) -> Result<CheckoutOrder, CheckoutError> {
        let order = self
            .pending
            .load(order_id)
            .await?
            .ok_or_else(|| CheckoutError::PendingOrderNotFound(order_id.clone()))?;
        self.pending.delete(order_id).await?;
        Ok(order)
    }

    /// The wallet reported success: settle the saved order.
    pub async fn complete(
        &self,
        order_id: &OrderId,
        payment_ref: impl Into<PaymentId>,
    ) -> Result<CheckoutOrder, CheckoutError> {
        let _serial = self.serial.lock().await;
        let order = self.take(order_id).await?.with_payment_id(payment_ref.into());
        Ok(settle(&self.cart, self.confirmation.as_ref(), order).await)
    }

    /// The customer came back without paying: drop the snapshot, keep the cart.
    pub async fn abandon(&self, order_id: &OrderId) -> Result<(), CheckoutError> {
        let _serial = self.serial.lock().await;
        self.take(order_id).await?;
        warn!(order_id = %order_id, "wallet payment abandoned");
        Ok(())
    }

    /// Orders still waiting for the customer to return, for an admin.
    pub async fn pending(
        &self,
        admin: &dyn AdminCapability,
    ) -> Result<Vec<CheckoutOrder>, CheckoutError> {
        if !admin.is_authorized() {
            return Err(CheckoutError::Unauthorized);
        }
        let orders = self.pending.list().await?;
        info!(count = orders.len(), "listed pending orders");
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartStore;
    use crate::catalog::Product;
    use crate::checkout::{CheckoutQuote, CustomerInfo, MemoryPendingOrders, PaymentProvider};
    use crate::config::PricingConfig;
    use crate::money::{Currency, Money};
    use async_trait::async_trait;

    struct Silent;

    struct Admin;

    impl AdminCapability for Admin {
        fn is_authorized(&self) -> bool {
            true
        }
    }

    #[async_trait]
    impl OrderConfirmation for Silent {
        async fn confirm(&self, _order: &CheckoutOrder) {}
    }

    async fn setup() -> (RedirectReturn, SharedCart, OrderId) {
        let cart = CartStore::shared(Currency::INR);
        let state = cart
            .lock()
            .await
            .add_item(&Product::new("tea", "Tulsi Tea", "tulsi-tea", Money::inr(300)));
        let quote =
            CheckoutQuote::compute(&state, PaymentProvider::WalletRedirect, &PricingConfig::default());
        let order =
            CheckoutOrder::from_quote(OrderId::generate(), &state, &quote, CustomerInfo::default());
        let pending = Arc::new(MemoryPendingOrders::new());
        pending.save(&order).await.unwrap();
        let id = order.order_id.clone();
        (RedirectReturn::new(cart.clone(), pending, Arc::new(Silent)), cart, id)
    }

    #[tokio::test]
    async fn test_complete_settles_once() {
        let (ret, cart, id) = setup().await;

        let order = ret.complete(&id, "wallet_txn_1").await.unwrap();
        assert_eq!(order.payment_id.unwrap().as_str(), "wallet_txn_1");
        assert!(cart.lock().await.state().is_empty());

        let again = ret.complete(&id, "wallet_txn_1").await;
        assert!(matches!(again, Err(CheckoutError::PendingOrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_pending_listing_requires_admin() {
        let (ret, _, _) = setup().await;
        assert!(matches!(
            ret.pending(&crate::orders::Anonymous).await,
            Err(CheckoutError::Unauthorized)
        ));
        assert_eq!(ret.pending(&Admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_abandon_keeps_cart() {
        let (ret, cart, id) = setup().await;
        ret.abandon(&id).await.unwrap();
        assert_eq!(cart.lock().await.state().item_count(), 1);
        assert!(ret.pending(&Admin).await.unwrap().is_empty());
    }
}
