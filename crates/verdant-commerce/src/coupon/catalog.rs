//! Coupon lookup.

use crate::coupon::Coupon;
use crate::error::CommerceError;
use async_trait::async_trait;

/// Read-only coupon lookup by code.
///
/// Implementations may sit behind a network call; the evaluator bounds each
/// lookup with a timeout.
#[async_trait]
pub trait CouponCatalog: Send + Sync {
    /// Find a coupon by code, case-insensitively.
    async fn find(&self, code: &str) -> Result<Option<Coupon>, CommerceError>;
}

/// Fixed in-memory coupon list.
#[derive(Debug, Clone, Default)]
pub struct StaticCouponCatalog {
    coupons: Vec<Coupon>,
}

impl StaticCouponCatalog {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }
}

#[async_trait]
impl CouponCatalog for StaticCouponCatalog {
    async fn find(&self, code: &str) -> Result<Option<Coupon>, CommerceError> {
        Ok(self.coupons.iter().find(|c| c.matches(code)).cloned())
    }
}
