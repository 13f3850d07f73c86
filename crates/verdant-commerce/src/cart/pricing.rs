//! Cart pricing calculations.

use crate::cart::LineItem;
use crate::coupon::AppliedCouponResult;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Derived totals for a cart snapshot.
///
/// Always computed together from `(items, applied coupon)`; never edited
/// field by field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of unit price times quantity.
    pub subtotal: Money,
    /// Sum of quantities.
    pub item_count: i64,
    /// Discount from a successful coupon, zero otherwise.
    pub discount: Money,
    /// `max(0, subtotal - discount)`.
    pub final_total: Money,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            item_count: 0,
            discount: Money::zero(currency),
            final_total: Money::zero(currency),
        }
    }

    /// Compute totals from line items and the applied coupon.
    pub fn compute(
        items: &[LineItem],
        coupon: Option<&AppliedCouponResult>,
        currency: Currency,
    ) -> Self {
        let subtotal = items.iter().fold(Money::zero(currency), |acc, item| {
            Money::new(acc.amount.saturating_add(item.line_total().amount), currency)
        });
        let item_count = items.iter().map(|i| i.quantity).sum();

        let discount = match coupon {
            Some(result) if result.is_success() => Money::new(result.discount().amount, currency),
            _ => Money::zero(currency),
        };

        Self {
            subtotal,
            item_count,
            discount,
            final_total: subtotal.floor_subtract(&discount),
        }
    }

    /// Check if a discount is in effect.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Savings as a share of the subtotal, in percent.
    pub fn discount_percentage(&self) -> f64 {
        if self.subtotal.amount == 0 {
            return 0.0;
        }
        (self.discount.amount as f64 / self.subtotal.amount as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::Coupon;
    use chrono::NaiveDate;

    fn item(id: &str, price: i64, quantity: i64) -> LineItem {
        LineItem {
            id: id.into(),
            name: id.to_string(),
            unit_price: Money::inr(price),
            image: String::new(),
            slug: id.to_string(),
            quantity,
        }
    }

    fn applied(discount: i64) -> AppliedCouponResult {
        let coupon = Coupon::flat("FLAT", discount, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        AppliedCouponResult::success(coupon, Money::inr(discount), Money::inr(0))
    }

    #[test]
    fn test_totals_sum_lines() {
        let items = vec![item("a", 450, 2), item("b", 120, 3)];
        let totals = CartTotals::compute(&items, None, Currency::INR);
        assert_eq!(totals.subtotal, Money::inr(1260));
        assert_eq!(totals.item_count, 5);
        assert_eq!(totals.final_total, Money::inr(1260));
    }

    #[test]
    fn test_final_total_floors_at_zero() {
        let items = vec![item("a", 80, 1)];
        let totals = CartTotals::compute(&items, Some(&applied(100)), Currency::INR);
        assert_eq!(totals.discount, Money::inr(100));
        assert_eq!(totals.final_total, Money::inr(0));
    }

    #[test]
    fn test_failed_coupon_counts_zero() {
        let items = vec![item("a", 500, 1)];
        let failed = AppliedCouponResult::failure("Invalid coupon code");
        let totals = CartTotals::compute(&items, Some(&failed), Currency::INR);
        assert!(!totals.has_discount());
        assert_eq!(totals.final_total, Money::inr(500));
    }

    #[test]
    fn test_discount_percentage() {
        let items = vec![item("a", 1000, 1)];
        let totals = CartTotals::compute(&items, Some(&applied(100)), Currency::INR);
        assert!((totals.discount_percentage() - 10.0).abs() < 0.01);
    }
}
