//! Coupon definitions and evaluation results.

use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a coupon discounts the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Fixed amount off.
    Flat,
    /// Percentage of the subtotal off.
    Percent,
}

impl CouponKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Flat => "flat",
            CouponKind::Percent => "percent",
        }
    }
}

/// A coupon definition.
///
/// Amounts are whole units of the store currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Code the customer types (matched case-insensitively).
    pub code: String,
    pub kind: CouponKind,
    /// Rupees off for `Flat`, percent off for `Percent`.
    pub value: i64,
    /// Minimum pre-discount subtotal.
    #[serde(default)]
    pub min_order_value: i64,
    /// Last day the coupon can be used.
    pub expires_on: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Marketing description (e.g., "Flat ₹100 off on orders above ₹499").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Coupon {
    /// Create a flat-amount coupon.
    pub fn flat(code: impl Into<String>, amount: i64, expires_on: NaiveDate) -> Self {
        Self {
            code: code.into(),
            kind: CouponKind::Flat,
            value: amount,
            min_order_value: 0,
            expires_on,
            active: true,
            description: None,
        }
    }

    /// Create a percentage coupon.
    pub fn percent(code: impl Into<String>, percent: i64, expires_on: NaiveDate) -> Self {
        Self {
            code: code.into(),
            kind: CouponKind::Percent,
            value: percent,
            min_order_value: 0,
            expires_on,
            active: true,
            description: None,
        }
    }

    pub fn with_min_order_value(mut self, amount: i64) -> Self {
        self.min_order_value = amount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Case-insensitive code comparison.
    pub fn matches(&self, code: &str) -> bool {
        self.code.trim().eq_ignore_ascii_case(code.trim())
    }

    /// Expired once `today` is past the last valid day.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expires_on
    }
}

/// Outcome of the last coupon evaluation attempt.
///
/// Fields are private so a discount can only be carried by a successful
/// result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCouponResult {
    success: bool,
    discount: Money,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coupon: Option<Coupon>,
    /// Subtotal the discount was computed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evaluated_subtotal: Option<Money>,
}

impl AppliedCouponResult {
    /// A successful evaluation. Negative discounts are clamped to zero.
    pub fn success(coupon: Coupon, discount: Money, evaluated_subtotal: Money) -> Self {
        let discount = Money::new(discount.amount.max(0), discount.currency);
        Self {
            success: true,
            message: format!("Coupon {} applied! You save {}", coupon.code.to_uppercase(), discount),
            discount,
            coupon: Some(coupon),
            evaluated_subtotal: Some(evaluated_subtotal),
        }
    }

    /// A rejected code, kept for its message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            discount: Money::default(),
            message: message.into(),
            coupon: None,
            evaluated_subtotal: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Discount granted; zero for failed results.
    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Code of the applied coupon, upper-cased.
    pub fn code(&self) -> Option<String> {
        self.coupon.as_ref().map(|c| c.code.to_uppercase())
    }

    pub fn evaluated_subtotal(&self) -> Option<Money> {
        self.evaluated_subtotal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_code_matching_is_case_insensitive() {
        let coupon = Coupon::flat("WELCOME100", 100, date(2030, 1, 1));
        assert!(coupon.matches("welcome100"));
        assert!(coupon.matches("  Welcome100 "));
        assert!(!coupon.matches("WELCOME10"));
    }

    #[test]
    fn test_expiry_is_inclusive_of_last_day() {
        let coupon = Coupon::percent("MONSOON10", 10, date(2026, 7, 31));
        assert!(!coupon.is_expired_on(date(2026, 7, 31)));
        assert!(coupon.is_expired_on(date(2026, 8, 1)));
    }

    #[test]
    fn test_failure_carries_no_discount() {
        let result = AppliedCouponResult::failure("Invalid coupon code");
        assert!(!result.is_success());
        assert!(result.discount().is_zero());
        assert!(result.code().is_none());
    }

    #[test]
    fn test_success_clamps_negative_discount() {
        let coupon = Coupon::flat("ODD", -20, date(2030, 1, 1));
        let result = AppliedCouponResult::success(coupon, Money::inr(-20), Money::inr(500));
        assert!(result.is_success());
        assert_eq!(result.discount(), Money::inr(0));
    }

    #[test]
    fn test_coupon_deserializes_from_toml_shape() {
        let coupon: Coupon = serde_json::from_str(
            r#"{"code":"CHAI15","kind":"percent","value":15,"expires_on":"2026-12-31"}"#,
        )
        .unwrap();
        assert_eq!(coupon.kind, CouponKind::Percent);
        assert!(coupon.active);
        assert_eq!(coupon.min_order_value, 0);
    }
}
