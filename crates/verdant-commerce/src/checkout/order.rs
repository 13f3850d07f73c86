//! Settled order record.

use crate::cart::{CartState, LineItem};
use crate::checkout::{CheckoutQuote, CustomerInfo, PaymentProvider};
use crate::ids::{OrderId, PaymentId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutOrder {
    pub order_id: OrderId,
    /// Provider-issued payment reference; `None` for cash on delivery.
    pub payment_id: Option<PaymentId>,
    pub provider: PaymentProvider,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax: Money,
    /// Present only for cash on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod_charges: Option<Money>,
    pub discount: Money,
    pub total: Money,
    pub customer: CustomerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub placed_at: DateTime<Utc>,
}

impl CheckoutOrder {
    /// Snapshot a cart and its quote into an order.
    pub fn from_quote(
        order_id: OrderId,
        state: &CartState,
        quote: &CheckoutQuote,
        customer: CustomerInfo,
    ) -> Self {
        let coupon_code = state
            .applied_coupon()
            .filter(|c| c.is_success())
            .and_then(|c| c.code());
        Self {
            order_id,
            payment_id: None,
            provider: quote.provider,
            items: state.items().to_vec(),
            subtotal: quote.subtotal,
            tax: quote.tax,
            cod_charges: quote.provider.has_cod_surcharge().then_some(quote.cod_charges),
            discount: quote.discount,
            total: quote.total,
            customer,
            coupon_code,
            placed_at: Utc::now(),
        }
    }

    pub fn with_payment_id(mut self, payment_id: PaymentId) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check that the stored amounts add up.
    pub fn is_consistent(&self) -> bool {
        let currency = self.subtotal.currency;
        let lines = self
            .items
            .iter()
            .fold(Money::zero(currency), |acc, i| acc.saturating_add(&i.line_total()));
        let final_total = self.subtotal.floor_subtract(&self.discount);
        let cod = self.cod_charges.unwrap_or_else(|| Money::zero(currency));
        lines == self.subtotal
            && final_total.saturating_add(&self.tax).saturating_add(&cod) == self.total
    }
}
