//! Chargeable amount for a checkout attempt.

use crate::cart::CartState;
use crate::checkout::PaymentProvider;
use crate::config::PricingConfig;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Amounts charged for one cart and provider.
///
/// Tax is levied on the post-discount total, never on the raw subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutQuote {
    pub provider: PaymentProvider,
    pub subtotal: Money,
    pub discount: Money,
    /// Subtotal less discount, floored at zero.
    pub final_total: Money,
    pub tax: Money,
    pub cod_charges: Money,
    /// `final_total + tax + cod_charges`.
    pub total: Money,
}

impl CheckoutQuote {
    pub fn compute(state: &CartState, provider: PaymentProvider, pricing: &PricingConfig) -> Self {
        let currency = state.currency();
        let final_total = state.final_total();
        let tax = final_total.basis_points(pricing.tax_rate_bps, pricing.rounding);
        let cod_charges = if provider.has_cod_surcharge() {
            Money::new(pricing.cod_surcharge, currency)
        } else {
            Money::zero(currency)
        };
        let total = final_total.saturating_add(&tax).saturating_add(&cod_charges);

        Self {
            provider,
            subtotal: state.subtotal(),
            discount: state.discount_amount(),
            final_total,
            tax,
            cod_charges,
            total,
        }
    }
}
