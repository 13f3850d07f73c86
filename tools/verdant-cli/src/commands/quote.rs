//! Price a cart without placing an order.

use anyhow::Result;
use serde_json::json;
use verdant_commerce::cart::CartState;
use verdant_commerce::checkout::CheckoutQuote;

use super::{build_cart, QuoteArgs};
use crate::context::Context;
use crate::output::Output;

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let (_cart, state) = build_cart(&args.cart, ctx).await?;
    let quote = CheckoutQuote::compute(&state, args.cart.provider, &ctx.config.pricing);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "items": state.items(),
            "coupon": state.applied_coupon().map(|c| json!({
                "code": c.code(),
                "success": c.is_success(),
                "message": c.message(),
            })),
            "quote": quote,
        }));
        return Ok(());
    }

    ctx.output.header("Quote");
    print_bill(&ctx.output, &state, &quote, ctx.config.pricing.tax_rate_bps);
    Ok(())
}

/// Print the cart lines and the pricing breakdown of a quote.
pub fn print_bill(output: &Output, state: &CartState, quote: &CheckoutQuote, tax_rate_bps: i64) {
    for item in state.items() {
        output.amount(&format!("{} x{}", item.name, item.quantity), item.line_total());
    }
    output.amount("Subtotal", quote.subtotal);
    if quote.discount.is_positive() {
        let label = match state.applied_coupon().and_then(|c| c.code()) {
            Some(code) => format!("Discount ({code})"),
            None => "Discount".to_string(),
        };
        output.amount(&label, quote.discount);
    }
    output.amount(&tax_label(tax_rate_bps), quote.tax);
    if quote.cod_charges.is_positive() {
        output.amount("COD charges", quote.cod_charges);
    }
    output.total("Total", quote.total);
    output.kv("Payment", quote.provider.display_name());
}

fn tax_label(bps: i64) -> String {
    if bps % 100 == 0 {
        format!("Tax ({}%)", bps / 100)
    } else {
        format!("Tax ({}.{:02}%)", bps / 100, bps % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_label() {
        assert_eq!(tax_label(1800), "Tax (18%)");
        assert_eq!(tax_label(1250), "Tax (12.50%)");
    }
}
