//! Coupon eligibility decisions.

use crate::config::CouponConfig;
use crate::coupon::{AppliedCouponResult, Clock, Coupon, CouponCatalog, CouponKind, SystemClock};
use crate::money::{Money, Rounding};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// Customer-facing rejection messages.
pub mod messages {
    pub const INVALID: &str = "Invalid coupon code";
    pub const INACTIVE: &str = "This coupon is no longer active";
    pub const EXPIRED: &str = "This offer has expired";
    pub const UNAVAILABLE: &str = "Unable to verify coupon right now. Please try again.";
}

/// Decide a coupon against a subtotal.
///
/// Rules run in order and the first rejection wins: unknown code, inactive,
/// expired, below minimum order value. Percent discounts are rounded with
/// `rounding`.
pub fn evaluate(
    coupon: Option<&Coupon>,
    today: NaiveDate,
    subtotal: Money,
    rounding: Rounding,
) -> AppliedCouponResult {
    let Some(coupon) = coupon else {
        return AppliedCouponResult::failure(messages::INVALID);
    };
    if !coupon.active {
        return AppliedCouponResult::failure(messages::INACTIVE);
    }
    if coupon.is_expired_on(today) {
        return AppliedCouponResult::failure(messages::EXPIRED);
    }
    if subtotal.amount < coupon.min_order_value {
        let shortfall = Money::new(coupon.min_order_value - subtotal.amount, subtotal.currency);
        return AppliedCouponResult::failure(format!("Add {} more to use this coupon", shortfall));
    }

    let discount = match coupon.kind {
        CouponKind::Flat => Money::new(coupon.value, subtotal.currency),
        CouponKind::Percent => subtotal.percent(coupon.value, rounding),
    };
    AppliedCouponResult::success(coupon.clone(), discount, subtotal)
}

/// Validates codes against a coupon catalog.
///
/// Never mutates a cart; callers feed the result into
/// [`CartStore::apply_coupon_result`](crate::cart::CartStore::apply_coupon_result).
pub struct CouponEvaluator {
    catalog: Arc<dyn CouponCatalog>,
    clock: Arc<dyn Clock>,
    config: CouponConfig,
}

impl CouponEvaluator {
    /// Create an evaluator using the wall clock and default settings.
    pub fn new(catalog: Arc<dyn CouponCatalog>) -> Self {
        Self {
            catalog,
            clock: Arc::new(SystemClock),
            config: CouponConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: CouponConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate `code` against a pre-discount subtotal.
    ///
    /// Lookup failures and timeouts come back as a failed result.
    pub async fn validate(&self, code: &str, subtotal: Money) -> AppliedCouponResult {
        let code = code.trim();
        if code.is_empty() {
            return AppliedCouponResult::failure(messages::INVALID);
        }

        let latency = self.config.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let lookup = tokio::time::timeout(self.config.lookup_timeout(), self.catalog.find(code));
        let coupon = match lookup.await {
            Ok(Ok(coupon)) => coupon,
            Ok(Err(e)) => {
                warn!(code, error = %e, "coupon lookup failed");
                return AppliedCouponResult::failure(messages::UNAVAILABLE);
            }
            Err(_) => {
                warn!(code, timeout_ms = self.config.lookup_timeout_ms, "coupon lookup timed out");
                return AppliedCouponResult::failure(messages::UNAVAILABLE);
            }
        };

        let result = evaluate(coupon.as_ref(), self.clock.today(), subtotal, self.config.rounding);
        debug!(
            code,
            success = result.is_success(),
            discount = result.discount().amount,
            "coupon evaluated"
        );
        result
    }
}
