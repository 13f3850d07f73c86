//! Pricing and checkout settings.
//!
//! All sections deserialize with defaults so a partial `verdant.toml` is
//! enough.

use crate::money::{Currency, Rounding};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tax and surcharge settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Store currency.
    pub currency: Currency,
    /// Tax on the post-discount total, in basis points (1800 = 18%).
    pub tax_rate_bps: i64,
    /// Flat surcharge for cash on delivery.
    pub cod_surcharge: i64,
    /// Rounding applied to tax.
    pub rounding: Rounding,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::INR,
            tax_rate_bps: 1800,
            cod_surcharge: 50,
            rounding: Rounding::HalfUp,
        }
    }
}

/// Coupon evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CouponConfig {
    /// Artificial round-trip delay before a lookup.
    pub latency_ms: u64,
    /// Upper bound on one catalog lookup.
    pub lookup_timeout_ms: u64,
    /// Rounding applied to percentage discounts.
    pub rounding: Rounding,
}

impl CouponConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self {
            latency_ms: 500,
            lookup_timeout_ms: 5_000,
            rounding: Rounding::HalfUp,
        }
    }
}

/// Payment dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Delay between UPI status checks.
    pub upi_poll_interval_ms: u64,
    /// Status checks before a UPI payment is given up.
    pub upi_max_polls: u32,
}

impl CheckoutConfig {
    pub fn upi_poll_interval(&self) -> Duration {
        Duration::from_millis(self.upi_poll_interval_ms)
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            upi_poll_interval_ms: 3_000,
            upi_max_polls: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_defaults() {
        let config = PricingConfig::default();
        assert_eq!(config.tax_rate_bps, 1800);
        assert_eq!(config.cod_surcharge, 50);
        assert_eq!(config.currency, Currency::INR);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: CheckoutConfig = serde_json::from_str(r#"{"upi_max_polls": 5}"#).unwrap();
        assert_eq!(config.upi_max_polls, 5);
        assert_eq!(config.upi_poll_interval_ms, 3_000);

        let coupons: CouponConfig = serde_json::from_str(r#"{"rounding": "half_even"}"#).unwrap();
        assert_eq!(coupons.rounding, Rounding::HalfEven);
        assert_eq!(coupons.latency(), Duration::from_millis(500));
    }
}
