//! Money type for representing monetary values.
//!
//! Storefront prices are whole rupees. Checkout arithmetic never produces a
//! fractional minor unit, so amounts are plain `i64` major units and every
//! fractional step (percent coupons, tax) goes through an explicit
//! [`Rounding`] policy. Gateways that expect minor units get them from
//! [`Money::to_minor_units`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    /// Minor units per major unit (paise per rupee).
    pub fn minor_units(&self) -> i64 {
        100
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// How a fractional result is brought back to a whole amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Halves round toward positive infinity (799 * 0.18 = 143.82 -> 144, 2.5 -> 3).
    #[default]
    HalfUp,
    /// Halves round to the even neighbour (2.5 -> 2, 3.5 -> 4).
    HalfEven,
}

/// A monetary value in whole major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in major units (rupees).
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Shorthand for a rupee amount.
    pub fn inr(amount: i64) -> Self {
        Self::new(amount, Currency::INR)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Add, saturating at the numeric bounds.
    pub fn saturating_add(&self, other: &Money) -> Money {
        Money::new(self.amount.saturating_add(other.amount), self.currency)
    }

    /// Subtract, flooring the result at zero.
    pub fn floor_subtract(&self, other: &Money) -> Money {
        Money::new(
            self.amount.saturating_sub(other.amount).max(0),
            self.currency,
        )
    }

    /// Try to add another Money value, returning None if currencies don't match.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, saturating at the numeric bounds.
    pub fn times(&self, quantity: i64) -> Money {
        Money::new(self.amount.saturating_mul(quantity), self.currency)
    }

    /// Scale by `numerator / denominator` and round back to whole units.
    ///
    /// Returns zero when `denominator` is zero.
    pub fn scale(&self, numerator: i64, denominator: i64, rounding: Rounding) -> Money {
        if denominator == 0 {
            return Money::zero(self.currency);
        }
        let product = self.amount as i128 * numerator as i128;
        let denom = denominator as i128;
        let quotient = product.div_euclid(denom);
        let twice_remainder = product.rem_euclid(denom) * 2;
        let abs_denom = denom.abs();

        let rounded = if twice_remainder > abs_denom {
            quotient + 1
        } else if twice_remainder == abs_denom {
            match rounding {
                Rounding::HalfUp => quotient + 1,
                Rounding::HalfEven if quotient % 2 != 0 => quotient + 1,
                Rounding::HalfEven => quotient,
            }
        } else {
            quotient
        };

        let amount = i64::try_from(rounded)
            .unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN });
        Money::new(amount, self.currency)
    }

    /// Calculate `percent`% of this amount.
    pub fn percent(&self, percent: i64, rounding: Rounding) -> Money {
        self.scale(percent, 100, rounding)
    }

    /// Calculate a rate given in basis points (1800 = 18%).
    pub fn basis_points(&self, bps: i64, rounding: Rounding) -> Money {
        self.scale(bps, 10_000, rounding)
    }

    /// Amount in minor units (paise), as payment gateways expect.
    pub fn to_minor_units(&self) -> i64 {
        self.amount.saturating_mul(self.currency.minor_units())
    }

    /// Format as a display string (e.g., "₹993").
    pub fn display(&self) -> String {
        if self.amount < 0 {
            format!("-{}{}", self.currency.symbol(), self.amount.unsigned_abs())
        } else {
            format!("{}{}", self.currency.symbol(), self.amount)
        }
    }

    /// Sum an iterator of Money values, saturating.
    pub fn sum<'a>(iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Money {
        iter.fold(Money::zero(currency), |acc, m| acc.saturating_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::inr(993).display(), "\u{20b9}993");
        assert_eq!(Money::new(-5, Currency::USD).display(), "-$5");
    }

    #[test]
    fn test_floor_subtract_never_negative() {
        let a = Money::inr(50);
        let b = Money::inr(100);
        assert_eq!(a.floor_subtract(&b), Money::inr(0));
        assert_eq!(b.floor_subtract(&a), Money::inr(50));
    }

    #[test]
    fn test_basis_points_tax() {
        // 799 * 18% = 143.82
        assert_eq!(Money::inr(799).basis_points(1800, Rounding::HalfUp).amount, 144);
        // 900 * 18% = 162
        assert_eq!(Money::inr(900).basis_points(1800, Rounding::HalfUp).amount, 162);
    }

    #[test]
    fn test_half_rounding_modes() {
        // 25 * 10% = 2.5
        assert_eq!(Money::inr(25).percent(10, Rounding::HalfUp).amount, 3);
        assert_eq!(Money::inr(25).percent(10, Rounding::HalfEven).amount, 2);
        // 35 * 10% = 3.5
        assert_eq!(Money::inr(35).percent(10, Rounding::HalfUp).amount, 4);
        assert_eq!(Money::inr(35).percent(10, Rounding::HalfEven).amount, 4);
    }

    #[test]
    fn test_scale_zero_denominator() {
        assert!(Money::inr(100).scale(1, 0, Rounding::HalfUp).is_zero());
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::inr(993).to_minor_units(), 99_300);
    }

    #[test]
    fn test_try_add_currency_mismatch() {
        let inr = Money::inr(10);
        let usd = Money::new(10, Currency::USD);
        assert!(inr.try_add(&usd).is_none());
        assert_eq!(inr.try_add(&inr), Some(Money::inr(20)));
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("inr"), Some(Currency::INR));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
