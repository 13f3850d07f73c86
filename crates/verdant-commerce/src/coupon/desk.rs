//! Feeds coupon evaluations into a shared cart.

use crate::cart::{CartState, SharedCart};
use crate::coupon::CouponEvaluator;
use crate::error::CommerceError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Applies, re-checks and removes coupons on one cart.
///
/// The cart lock is not held while the evaluator waits on the catalog, so
/// item edits keep flowing during validation. Only one validation runs at a
/// time.
pub struct CouponDesk {
    cart: SharedCart,
    evaluator: Arc<CouponEvaluator>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CouponDesk {
    pub fn new(cart: SharedCart, evaluator: Arc<CouponEvaluator>) -> Self {
        Self {
            cart,
            evaluator,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a validation is currently running.
    pub fn is_validating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate `code` against the current subtotal and store the result.
    ///
    /// Failed evaluations are stored too, for their message.
    pub async fn apply(&self, code: &str) -> Result<Arc<CartState>, CommerceError> {
        let _guard =
            InFlight::acquire(&self.in_flight).ok_or(CommerceError::CouponValidationInProgress)?;

        let subtotal = self.cart.lock().await.state().subtotal();
        let result = self.evaluator.validate(code, subtotal).await;
        info!(
            code,
            success = result.is_success(),
            discount = result.discount().amount,
            "coupon applied to cart"
        );

        let mut cart = self.cart.lock().await;
        Ok(cart.apply_coupon_result(result))
    }

    /// Re-run the applied code if the subtotal moved since it was evaluated.
    ///
    /// Returns the current snapshot unchanged when nothing needs re-checking.
    pub async fn revalidate(&self) -> Result<Arc<CartState>, CommerceError> {
        let (needs, code) = {
            let cart = self.cart.lock().await;
            let state = cart.state();
            let code = state.applied_coupon().and_then(|c| c.code());
            (state.needs_coupon_revalidation(), code)
        };

        match (needs, code) {
            (true, Some(code)) => {
                debug!(code = %code, "subtotal changed, revalidating coupon");
                self.apply(&code).await
            }
            _ => Ok(self.cart.lock().await.state()),
        }
    }

    /// Drop the applied coupon.
    pub async fn remove(&self) -> Arc<CartState> {
        self.cart.lock().await.remove_coupon()
    }
}
