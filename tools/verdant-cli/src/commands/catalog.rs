//! List products and coupons.

use anyhow::{bail, Result};
use chrono::Utc;
use serde_json::json;
use verdant_commerce::catalog::{Product, ProductCategory};
use verdant_commerce::coupon::{Coupon, CouponKind};
use verdant_commerce::Money;

use super::CatalogArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.config.product_catalog();

    let products: Vec<&Product> = match &args.category {
        Some(name) => {
            let Some(category) = ProductCategory::from_str(name) else {
                bail!("Unknown category: {}", name);
            };
            catalog
                .all()
                .iter()
                .filter(|p| p.category == category && (args.all || p.in_stock))
                .collect()
        }
        None => catalog
            .all()
            .iter()
            .filter(|p| args.all || p.in_stock)
            .collect(),
    };

    let today = Utc::now().date_naive();
    let coupons = &ctx.config.coupons;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "products": products,
            "coupons": coupons,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("{} catalog", ctx.config.store.name));
    let widths = [28, 12, 10, 10];
    ctx.output.table_row(&["Product", "Category", "Price", "Slug"], &widths);
    for product in &products {
        let price = product.price.display();
        let name = if product.in_stock {
            product.name.clone()
        } else {
            format!("{} (sold out)", product.name)
        };
        ctx.output.table_row(
            &[&name, product.category.as_str(), &price, &product.slug],
            &widths,
        );
    }
    if products.is_empty() {
        ctx.output.info("No products match");
    }

    ctx.output.header("Coupons");
    for coupon in coupons {
        let status = coupon_status(coupon, today);
        ctx.output.list_item(&format!(
            "{} {} {}",
            coupon.code,
            status_badge(status),
            describe(coupon, ctx.config.pricing.currency),
        ));
    }

    Ok(())
}

fn coupon_status(coupon: &Coupon, today: chrono::NaiveDate) -> &'static str {
    if !coupon.active {
        "inactive"
    } else if coupon.is_expired_on(today) {
        "expired"
    } else {
        "active"
    }
}

fn describe(coupon: &Coupon, currency: verdant_commerce::Currency) -> String {
    if let Some(description) = &coupon.description {
        return description.clone();
    }
    let off = match coupon.kind {
        CouponKind::Flat => format!("{} off", Money::new(coupon.value, currency)),
        CouponKind::Percent => format!("{}% off", coupon.value),
    };
    if coupon.min_order_value > 0 {
        format!(
            "{} on orders of {} or more",
            off,
            Money::new(coupon.min_order_value, currency)
        )
    } else {
        off
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use verdant_commerce::Currency;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_coupon_status() {
        let coupon = Coupon::flat("WELCOME100", 100, day(19));
        assert_eq!(coupon_status(&coupon, day(19)), "active");
        assert_eq!(coupon_status(&coupon, day(20)), "expired");
        assert_eq!(coupon_status(&coupon.inactive(), day(1)), "inactive");
    }

    #[test]
    fn test_describe_without_description() {
        let coupon = Coupon::flat("BIG", 250, day(31)).with_min_order_value(1499);
        assert_eq!(
            describe(&coupon, Currency::INR),
            "₹250 off on orders of ₹1499 or more"
        );
        assert_eq!(
            describe(&Coupon::percent("CHAI15", 15, day(31)), Currency::INR),
            "15% off"
        );
    }
}
