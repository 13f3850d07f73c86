//! CLI configuration.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use verdant_auth::AdminCredentials;
use verdant_commerce::catalog::{Product, ProductCatalog, ProductCategory};
use verdant_commerce::config::{CheckoutConfig, CouponConfig, PricingConfig};
use verdant_commerce::coupon::Coupon;
use verdant_commerce::Money;

/// CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront identity.
    #[serde(default)]
    pub store: StoreConfig,

    /// Tax and surcharge settings.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Coupon lookup settings.
    #[serde(default)]
    pub coupon: CouponConfig,

    /// Payment dispatch settings.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Where pending orders, sessions and receipts are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Admin login.
    #[serde(default)]
    pub admin: AdminCredentials,

    /// Simulated payment collaborators.
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Product catalog.
    #[serde(default = "default_products")]
    pub products: Vec<ProductEntry>,

    /// Coupon catalog.
    #[serde(default = "default_coupons")]
    pub coupons: Vec<Coupon>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            pricing: PricingConfig::default(),
            coupon: CouponConfig::default(),
            checkout: CheckoutConfig::default(),
            storage: StorageConfig::default(),
            admin: AdminCredentials::default(),
            simulator: SimulatorConfig::default(),
            products: default_products(),
            coupons: default_coupons(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Products priced in the store currency.
    pub fn product_catalog(&self) -> ProductCatalog {
        ProductCatalog::new(
            self.products
                .iter()
                .map(|entry| entry.to_product(&self.pricing))
                .collect(),
        )
    }
}

/// Storefront identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Verdant Naturals".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State directory, relative to the working directory unless absolute.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

fn default_state_dir() -> String {
    ".verdant/state".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

/// Behaviour of the terminal payment collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Status checks before a simulated UPI payment succeeds.
    #[serde(default = "default_upi_polls_to_success")]
    pub upi_polls_to_success: u32,

    /// Base URL for simulated wallet pages.
    #[serde(default = "default_wallet_url")]
    pub wallet_url: String,
}

fn default_upi_polls_to_success() -> u32 {
    2
}

fn default_wallet_url() -> String {
    "https://wallet.example.com/pay".to_string()
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            upi_polls_to_success: default_upi_polls_to_success(),
            wallet_url: default_wallet_url(),
        }
    }
}

/// A product as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Unit price in whole units of the store currency.
    pub price: i64,
    #[serde(default)]
    pub category: ProductCategory,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

fn default_true() -> bool {
    true
}

impl ProductEntry {
    fn new(id: &str, name: &str, slug: &str, price: i64, category: ProductCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            price,
            category,
            image: format!("/images/products/{slug}.webp"),
            in_stock: true,
        }
    }

    pub fn to_product(&self, pricing: &PricingConfig) -> Product {
        let mut product = Product::new(
            self.id.as_str(),
            self.name.as_str(),
            self.slug.as_str(),
            Money::new(self.price, pricing.currency),
        )
        .with_category(self.category)
        .with_image(self.image.as_str());
        product.in_stock = self.in_stock;
        product
    }
}

fn default_products() -> Vec<ProductEntry> {
    vec![
        ProductEntry::new("vn-oil-001", "Cold Pressed Coconut Oil", "cold-pressed-coconut-oil", 349, ProductCategory::Oils),
        ProductEntry::new("vn-oil-002", "Lavender Essential Oil", "lavender-essential-oil", 899, ProductCategory::Oils),
        ProductEntry::new("vn-cof-001", "Chikmagalur Filter Coffee", "chikmagalur-filter-coffee", 450, ProductCategory::Coffee),
        ProductEntry::new("vn-tea-001", "Tulsi Green Tea", "tulsi-green-tea", 500, ProductCategory::Tea),
        ProductEntry::new("vn-tea-002", "Ashwagandha Masala Chai", "ashwagandha-masala-chai", 399, ProductCategory::Tea),
        ProductEntry::new("vn-skn-001", "Kumkumadi Face Serum", "kumkumadi-face-serum", 1299, ProductCategory::Skincare),
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MAX)
}

fn default_coupons() -> Vec<Coupon> {
    vec![
        Coupon::flat("WELCOME100", 100, date(2027, 3, 31))
            .with_min_order_value(499)
            .with_description("Flat ₹100 off on orders above ₹499"),
        Coupon::percent("CHAI15", 15, date(2027, 3, 31))
            .with_description("15% off your cart"),
        Coupon::flat("WELLNESS250", 250, date(2027, 3, 31))
            .with_min_order_value(1499)
            .with_description("Flat ₹250 off on orders above ₹1499"),
        Coupon::percent("MONSOON20", 20, date(2026, 9, 30))
            .with_description("Monsoon sale, 20% off"),
        Coupon::flat("LAUNCH50", 50, date(2027, 3, 31)).inactive(),
    ]
}

/// Generate a default verdant.toml config file.
pub fn generate_default_config(store_name: &str) -> String {
    format!(
        r#"# Verdant storefront configuration

[store]
name = "{store_name}"

[pricing]
currency = "INR"
# 1800 basis points = 18%, levied on the post-discount total
tax_rate_bps = 1800
cod_surcharge = 50
rounding = "half_up"

[coupon]
latency_ms = 500
lookup_timeout_ms = 5000
# half_up or half_even, applied to percentage discounts
rounding = "half_up"

[checkout]
upi_poll_interval_ms = 3000
upi_max_polls = 20

[storage]
state_dir = ".verdant/state"

[admin]
username = "admin"
# Generate with `verdant admin hash-password`
password_hash = ""

[simulator]
upi_polls_to_success = 2
wallet_url = "https://wallet.example.com/pay"

[[products]]
id = "vn-oil-001"
name = "Cold Pressed Coconut Oil"
slug = "cold-pressed-coconut-oil"
price = 349
category = "oils"

[[products]]
id = "vn-cof-001"
name = "Chikmagalur Filter Coffee"
slug = "chikmagalur-filter-coffee"
price = 450
category = "coffee"

[[products]]
id = "vn-tea-001"
name = "Tulsi Green Tea"
slug = "tulsi-green-tea"
price = 500
category = "tea"

[[coupons]]
code = "WELCOME100"
kind = "flat"
value = 100
min_order_value = 499
expires_on = "2027-03-31"
description = "Flat ₹100 off on orders above ₹499"

[[coupons]]
code = "CHAI15"
kind = "percent"
value = 15
expires_on = "2027-03-31"
"#,
        store_name = store_name
    )
}
