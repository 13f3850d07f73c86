//! Checkout module.
//!
//! Customer details, pricing of an attempt, the payment state machine and
//! its external collaborators.

mod customer;
mod flow;
mod gateway;
mod order;
mod pending;
mod provider;
mod quote;
mod redirect;

pub use customer::{CustomerField, CustomerInfo, FieldErrors};
pub use flow::{CheckoutOrchestrator, CheckoutOutcome, CheckoutPhase};
pub use gateway::{
    CustomerPrefill, OrderConfirmation, PaymentGateway, PaymentRequest, PendingOrderStore,
    ProviderRefs, UpiCollect, UpiIntent, UpiStatus, WalletRedirect,
};
pub use order::CheckoutOrder;
pub use pending::MemoryPendingOrders;
#[cfg(feature = "storage")]
pub use pending::CachePendingOrders;
pub use provider::{DispatchKind, PaymentProvider};
pub use quote::CheckoutQuote;
pub use redirect::RedirectReturn;
