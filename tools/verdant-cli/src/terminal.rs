//! Payment collaborators that run in the terminal.
//!
//! The card widget is a confirmation prompt, UPI and the wallet are
//! simulated, and confirmed orders are printed and kept in the state store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dialoguer::Confirm;
use tracing::{debug, warn};
use verdant_cache::{cache_key, Cache};
use verdant_commerce::checkout::{
    CheckoutOrder, OrderConfirmation, PaymentGateway, PaymentRequest, ProviderRefs, UpiCollect,
    UpiIntent, UpiStatus, WalletRedirect,
};
use verdant_commerce::{PaymentError, PaymentId};

use crate::output::Output;

/// Namespace for settled orders in the state store.
pub const RECEIPT_NAMESPACE: &str = "order";

/// Card or gateway-UPI widget: asks the customer to approve the charge.
pub struct PromptGateway {
    auto_approve: bool,
}

impl PromptGateway {
    pub fn new(auto_approve: bool) -> Self {
        Self { auto_approve }
    }
}

#[async_trait]
impl PaymentGateway for PromptGateway {
    async fn open(&self, request: &PaymentRequest) -> Result<ProviderRefs, PaymentError> {
        let approved = if self.auto_approve {
            true
        } else {
            let prompt = format!(
                "Pay {} ({} paise) for {} as {}?",
                request.amount, request.amount_minor, request.order_id, request.prefill.name
            );
            tokio::task::spawn_blocking(move || {
                Confirm::new().with_prompt(prompt).default(true).interact()
            })
            .await
            .map_err(|e| PaymentError::Unreachable(e.to_string()))?
            .map_err(|e| PaymentError::Unreachable(e.to_string()))?
        };

        if !approved {
            return Err(PaymentError::Dismissed);
        }
        let mut refs = ProviderRefs::new(PaymentId::generate());
        refs.provider_order_id = Some(format!("gw_{}", request.order_id));
        debug!(order_id = %request.order_id, payment_id = %refs.payment_id, "widget approved");
        Ok(refs)
    }
}

/// UPI collect that succeeds after a fixed number of status checks.
pub struct SimulatedUpi {
    polls_to_success: u32,
    polls: AtomicU32,
}

impl SimulatedUpi {
    pub fn new(polls_to_success: u32) -> Self {
        Self {
            polls_to_success,
            polls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl UpiCollect for SimulatedUpi {
    async fn start(&self, request: &PaymentRequest) -> Result<UpiIntent, PaymentError> {
        self.polls.store(0, Ordering::SeqCst);
        Ok(UpiIntent {
            reference: format!("upi_{}", request.order_id),
            intent_url: format!(
                "upi://pay?pa=verdant@upi&pn=Verdant&am={}&cu={}&tr={}",
                request.amount.amount, request.currency, request.order_id
            ),
        })
    }

    async fn status(&self, intent: &UpiIntent) -> Result<UpiStatus, PaymentError> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if seen < self.polls_to_success {
            return Ok(UpiStatus::Pending);
        }
        Ok(UpiStatus::Success {
            payment_id: PaymentId::new(format!("{}_paid", intent.reference)),
        })
    }
}

/// Wallet whose payment page lives at a fixed URL.
pub struct SimulatedWallet {
    base_url: String,
}

impl SimulatedWallet {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WalletRedirect for SimulatedWallet {
    async fn begin(&self, request: &PaymentRequest) -> Result<String, PaymentError> {
        Ok(format!(
            "{}?order={}&amount={}&currency={}",
            self.base_url.trim_end_matches('/'),
            request.order_id,
            request.amount_minor,
            request.currency
        ))
    }
}

/// Prints each settled order and keeps it under `order:{id}`.
pub struct ReceiptPrinter {
    cache: Arc<Cache>,
    output: Output,
}

impl ReceiptPrinter {
    pub fn new(cache: Arc<Cache>, output: Output) -> Self {
        Self { cache, output }
    }
}

#[async_trait]
impl OrderConfirmation for ReceiptPrinter {
    async fn confirm(&self, order: &CheckoutOrder) {
        if let Err(e) = self
            .cache
            .set(&cache_key!(RECEIPT_NAMESPACE, order.order_id), order)
        {
            warn!(order_id = %order.order_id, error = %e, "failed to keep receipt");
        }

        if self.output.is_json() {
            self.output.json(order);
            return;
        }
        print_receipt(&self.output, order);
    }
}

/// Human-readable order summary.
pub fn print_receipt(output: &Output, order: &CheckoutOrder) {
    output.header(&format!("Order {}", order.order_id));
    for item in &order.items {
        output.amount(
            &format!("{} x{}", item.name, item.quantity),
            item.line_total(),
        );
    }
    output.amount("Subtotal", order.subtotal);
    if order.discount.is_positive() {
        let label = match &order.coupon_code {
            Some(code) => format!("Discount ({code})"),
            None => "Discount".to_string(),
        };
        output.amount(&label, order.discount);
    }
    output.amount("Tax", order.tax);
    if let Some(cod) = order.cod_charges {
        output.amount("COD charges", cod);
    }
    output.total("Total", order.total);
    output.kv("Payment", order.provider.display_name());
    if let Some(payment_id) = &order.payment_id {
        output.kv("Payment ref", payment_id.as_str());
    }
    output.kv("Ship to", &order.customer.one_line_address());
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_commerce::checkout::CustomerInfo;
    use verdant_commerce::{Money, OrderId};

    fn request() -> PaymentRequest {
        PaymentRequest::new(OrderId::new("ORD-42"), Money::inr(531), &CustomerInfo::default())
    }

    #[tokio::test]
    async fn test_simulated_upi_succeeds_after_configured_polls() {
        let upi = SimulatedUpi::new(3);
        let intent = upi.start(&request()).await.unwrap();
        assert!(intent.intent_url.contains("am=531"));

        assert_eq!(upi.status(&intent).await.unwrap(), UpiStatus::Pending);
        assert_eq!(upi.status(&intent).await.unwrap(), UpiStatus::Pending);
        assert!(matches!(
            upi.status(&intent).await.unwrap(),
            UpiStatus::Success { .. }
        ));
    }

    #[tokio::test]
    async fn test_wallet_url_carries_minor_units() {
        let wallet = SimulatedWallet::new("https://wallet.test/pay/");
        let url = wallet.begin(&request()).await.unwrap();
        assert_eq!(url, "https://wallet.test/pay?order=ORD-42&amount=53100&currency=INR");
    }

    #[tokio::test]
    async fn test_auto_approved_gateway_issues_refs() {
        let refs = PromptGateway::new(true).open(&request()).await.unwrap();
        assert_eq!(refs.provider_order_id.as_deref(), Some("gw_ORD-42"));
    }
}
