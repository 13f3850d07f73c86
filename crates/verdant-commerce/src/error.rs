//! Commerce error types.
//!
//! Coupon rejections are not errors: they travel as a failed
//! [`AppliedCouponResult`](crate::coupon::AppliedCouponResult) so the message
//! can be shown next to the cart.

use crate::checkout::FieldErrors;
use crate::ids::OrderId;
use thiserror::Error;

/// Errors outside the checkout state machine.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Caller holds no admin capability.
    #[error("Not authorized")]
    Unauthorized,

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A coupon code is already being validated for this cart.
    #[error("A coupon is already being validated")]
    CouponValidationInProgress,

    /// Coupon catalog lookup failed.
    #[error("Coupon lookup failed: {0}")]
    CouponLookup(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[cfg(feature = "storage")]
impl From<verdant_cache::CacheError> for CommerceError {
    fn from(e: verdant_cache::CacheError) -> Self {
        CommerceError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

/// Why a payment dispatch did not settle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Customer closed the payment widget.
    #[error("Payment cancelled by customer")]
    Dismissed,

    /// Provider declined the payment.
    #[error("Payment declined: {0}")]
    Declined(String),

    /// Provider could not be reached.
    #[error("Payment provider unreachable: {0}")]
    Unreachable(String),

    /// Status polling ran out of attempts.
    #[error("Payment not confirmed after {attempts} status checks")]
    TimedOut { attempts: u32 },
}

/// Errors from the checkout orchestrator.
///
/// Every variant leaves cart and coupon state as they were.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Customer fields failed validation.
    #[error("Invalid customer details: {0}")]
    Validation(FieldErrors),

    /// Nothing to pay for.
    #[error("Cart is empty")]
    EmptyCart,

    /// The applied coupon was evaluated against a different subtotal.
    #[error("Coupon {0} must be re-validated against the current cart")]
    CouponNeedsRevalidation(String),

    /// A payment attempt is already running.
    #[error("A payment attempt is already in progress")]
    AttemptInProgress,

    /// Payment dispatch failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Customer cancelled the attempt.
    #[error("Payment attempt cancelled")]
    Cancelled,

    /// No pending redirect order with this id.
    #[error("No pending order: {0}")]
    PendingOrderNotFound(OrderId),

    /// Caller holds no admin capability.
    #[error("Not authorized")]
    Unauthorized,

    /// Pending-order store failure.
    #[error("Pending order storage failed: {0}")]
    Storage(String),
}

impl CheckoutError {
    /// Whether the customer can simply try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Payment(_) | CheckoutError::Cancelled | CheckoutError::Storage(_)
        )
    }
}

impl From<CommerceError> for CheckoutError {
    fn from(e: CommerceError) -> Self {
        match e {
            CommerceError::Unauthorized => CheckoutError::Unauthorized,
            other => CheckoutError::Storage(other.to_string()),
        }
    }
}
