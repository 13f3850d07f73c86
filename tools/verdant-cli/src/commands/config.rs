//! Configuration management commands.

use std::collections::HashSet;
use std::fs;

use anyhow::{bail, Result};
use chrono::Utc;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(built-in defaults)"),
    }

    let config = &ctx.config;
    ctx.output.info("[pricing]");
    ctx.output.kv("currency", config.pricing.currency.code());
    ctx.output.kv("tax_rate_bps", &config.pricing.tax_rate_bps.to_string());
    ctx.output.kv("cod_surcharge", &config.pricing.cod_surcharge.to_string());

    ctx.output.info("[coupon]");
    ctx.output.kv("latency_ms", &config.coupon.latency_ms.to_string());
    ctx.output
        .kv("lookup_timeout_ms", &config.coupon.lookup_timeout_ms.to_string());

    ctx.output.info("[checkout]");
    ctx.output
        .kv("upi_poll_interval_ms", &config.checkout.upi_poll_interval_ms.to_string());
    ctx.output.kv("upi_max_polls", &config.checkout.upi_max_polls.to_string());

    ctx.output.info("[storage]");
    ctx.output.kv("state_dir", &ctx.state_dir().display().to_string());

    ctx.output.info("[admin]");
    ctx.output.kv("username", &config.admin.username);
    let hash_state = if config.admin.password_hash.is_empty() {
        "(not set)"
    } else {
        "(set)"
    };
    ctx.output.kv("password_hash", hash_state);

    ctx.output.info(&format!(
        "{} products, {} coupons",
        config.products.len(),
        config.coupons.len()
    ));

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = generate_default_config(&ctx.config.store.name);
    fs::write(&config_path, content)?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config, Utc::now().date_naive());

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

fn check(config: &CliConfig, today: chrono::NaiveDate) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if config.pricing.tax_rate_bps < 0 {
        errors.push("pricing.tax_rate_bps must not be negative".to_string());
    }
    if config.pricing.cod_surcharge < 0 {
        errors.push("pricing.cod_surcharge must not be negative".to_string());
    }
    if config.checkout.upi_max_polls == 0 {
        errors.push("checkout.upi_max_polls must be at least 1".to_string());
    }
    if config.coupon.lookup_timeout_ms == 0 {
        warnings.push("coupon.lookup_timeout_ms is 0, every lookup will time out".to_string());
    }

    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();
    for (i, product) in config.products.iter().enumerate() {
        if product.price < 0 {
            errors.push(format!("products[{}].price must not be negative", i));
        }
        if !ids.insert(product.id.as_str()) {
            errors.push(format!("products[{}].id '{}' is duplicated", i, product.id));
        }
        if !slugs.insert(product.slug.as_str()) {
            errors.push(format!("products[{}].slug '{}' is duplicated", i, product.slug));
        }
    }

    let mut codes = HashSet::new();
    for (i, coupon) in config.coupons.iter().enumerate() {
        if coupon.code.trim().is_empty() {
            errors.push(format!("coupons[{}].code is required", i));
        }
        if !codes.insert(coupon.code.trim().to_uppercase()) {
            errors.push(format!("coupons[{}].code '{}' is duplicated", i, coupon.code));
        }
        if coupon.value < 0 {
            errors.push(format!("coupons[{}].value must not be negative", i));
        }
        if coupon.kind == verdant_commerce::coupon::CouponKind::Percent && coupon.value > 100 {
            errors.push(format!("coupons[{}].value is over 100%", i));
        }
        if coupon.active && coupon.is_expired_on(today) {
            warnings.push(format!("coupon {} expired on {}", coupon.code, coupon.expires_on));
        }
    }

    if config.admin.password_hash.is_empty() {
        warnings.push("admin.password_hash is not set, admin login is disabled".to_string());
    }

    (errors, warnings)
}
