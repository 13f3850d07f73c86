//! External collaborators of the checkout orchestrator.
//!
//! Payment protocols are opaque here; each provider family is reached
//! through one of these traits so tests can inject deterministic fakes.

use crate::checkout::{CheckoutOrder, CustomerInfo};
use crate::error::{CommerceError, PaymentError};
use crate::ids::{OrderId, PaymentId};
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Contact details pre-filled into a payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPrefill {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&CustomerInfo> for CustomerPrefill {
    fn from(info: &CustomerInfo) -> Self {
        Self {
            name: info.full_name(),
            email: info.email.trim().to_string(),
            phone: info.phone.trim().to_string(),
        }
    }
}

/// What a payment collaborator is asked to collect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub amount: Money,
    /// `amount` in minor units (paise).
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
    pub prefill: CustomerPrefill,
}

impl PaymentRequest {
    pub fn new(order_id: OrderId, amount: Money, customer: &CustomerInfo) -> Self {
        Self {
            order_id,
            amount,
            amount_minor: amount.to_minor_units(),
            currency: amount.currency.code().to_string(),
            prefill: CustomerPrefill::from(customer),
        }
    }
}

/// References issued by a provider on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRefs {
    pub payment_id: PaymentId,
    /// Provider's own order reference, if it issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_order_id: Option<String>,
}

impl ProviderRefs {
    pub fn new(payment_id: impl Into<PaymentId>) -> Self {
        Self {
            payment_id: payment_id.into(),
            provider_order_id: None,
        }
    }
}

/// Embedded payment widget (card or UPI through the gateway).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open the widget and wait for the customer.
    ///
    /// A dismissed widget is [`PaymentError::Dismissed`].
    async fn open(&self, request: &PaymentRequest) -> Result<ProviderRefs, PaymentError>;
}

/// Wallet that completes payment on its own page.
#[async_trait]
pub trait WalletRedirect: Send + Sync {
    /// Begin a wallet payment, returning the URL to send the customer to.
    async fn begin(&self, request: &PaymentRequest) -> Result<String, PaymentError>;
}

/// An in-app UPI collect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiIntent {
    /// Provider handle used for status checks.
    pub reference: String,
    /// `upi://pay?...` link, also rendered as a QR code.
    pub intent_url: String,
}

/// Status of a UPI collect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpiStatus {
    Pending,
    Success { payment_id: PaymentId },
    Failure { reason: String },
}

/// UPI intent or QR flow confirmed by polling.
#[async_trait]
pub trait UpiCollect: Send + Sync {
    async fn start(&self, request: &PaymentRequest) -> Result<UpiIntent, PaymentError>;

    async fn status(&self, intent: &UpiIntent) -> Result<UpiStatus, PaymentError>;
}

/// Durable hand-off for orders awaiting out-of-band confirmation.
#[async_trait]
pub trait PendingOrderStore: Send + Sync {
    async fn save(&self, order: &CheckoutOrder) -> Result<(), CommerceError>;

    async fn load(&self, order_id: &OrderId) -> Result<Option<CheckoutOrder>, CommerceError>;

    async fn delete(&self, order_id: &OrderId) -> Result<(), CommerceError>;

    /// All orders still awaiting confirmation.
    async fn list(&self) -> Result<Vec<CheckoutOrder>, CommerceError>;
}

/// Receives every settled order for display.
#[async_trait]
pub trait OrderConfirmation: Send + Sync {
    async fn confirm(&self, order: &CheckoutOrder);
}
