//! CLI command implementations.

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod quote;
pub mod redirect;

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Args, Subcommand};
use verdant_commerce::cart::{CartState, CartStore, SharedCart};
use verdant_commerce::catalog::ProductCatalog;
use verdant_commerce::checkout::{CustomerInfo, PaymentProvider};
use verdant_commerce::coupon::CouponDesk;

use crate::context::Context;
use crate::output::status_badge;

/// A cart line given on the command line as `slug` or `slug:QTY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub key: String,
    pub quantity: i64,
}

impl std::str::FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, quantity) = match s.rsplit_once(':') {
            Some((key, qty)) => {
                let quantity: i64 = qty
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid quantity '{qty}' in '{s}'"))?;
                (key, quantity)
            }
            None => (s, 1),
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing product in '{s}'"));
        }
        if quantity < 1 {
            return Err(format!("quantity must be at least 1 in '{s}'"));
        }
        Ok(Self {
            key: key.to_string(),
            quantity,
        })
    }
}

fn parse_provider(s: &str) -> Result<PaymentProvider, String> {
    PaymentProvider::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = PaymentProvider::ALL.iter().map(|p| p.as_str()).collect();
        format!("unknown payment method '{s}' (expected one of: {})", known.join(", "))
    })
}

/// Cart contents shared by `quote` and `checkout`.
#[derive(Args)]
pub struct CartArgs {
    /// Product slug or id, optionally with a quantity (`tulsi-green-tea:2`).
    #[arg(short, long = "item", required = true)]
    pub items: Vec<ItemSpec>,

    /// Coupon code to apply.
    #[arg(long)]
    pub coupon: Option<String>,

    /// Payment method: cod, card, gateway_upi, wallet, upi_qr.
    #[arg(short, long, default_value = "cod", value_parser = parse_provider)]
    pub provider: PaymentProvider,
}

/// Fill a fresh cart from the command line and apply the coupon, if any.
pub async fn build_cart(args: &CartArgs, ctx: &Context) -> Result<(SharedCart, Arc<CartState>)> {
    let catalog = ctx.config.product_catalog();
    let cart = CartStore::shared(ctx.config.pricing.currency);
    fill_cart(&cart, &catalog, &args.items).await?;

    let state = match &args.coupon {
        Some(code) => {
            let desk = CouponDesk::new(cart.clone(), Arc::new(ctx.coupon_evaluator()));
            let spinner = ctx.output.spinner(&format!("Checking coupon {}", code.trim()));
            let state = desk.apply(code).await?;
            spinner.finish_and_clear();
            if let Some(result) = state.applied_coupon() {
                if result.is_success() {
                    ctx.output
                        .success(&format!("{} {}", status_badge("applied"), result.message()));
                } else {
                    ctx.output
                        .warn(&format!("{} {}", status_badge("rejected"), result.message()));
                }
            }
            state
        }
        None => cart.lock().await.state(),
    };

    Ok((cart, state))
}

async fn fill_cart(cart: &SharedCart, catalog: &ProductCatalog, items: &[ItemSpec]) -> Result<()> {
    let mut store = cart.lock().await;
    for spec in items {
        let product = catalog
            .find(&spec.key)
            .ok_or_else(|| anyhow!("Unknown product: {}", spec.key))?;
        if !product.in_stock {
            bail!("{} is out of stock", product.name);
        }
        let current = store
            .state()
            .get_item(&product.id)
            .map(|item| item.quantity)
            .unwrap_or(0);
        store.add_item(product);
        store.update_quantity(&product.id, current + spec.quantity);
    }
    Ok(())
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only list products in this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Include out-of-stock products.
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub cart: CartArgs,
}

/// Customer details for checkout.
#[derive(Args, Default)]
pub struct CustomerArgs {
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub state: String,
    #[arg(long, default_value = "")]
    pub pincode: String,
}

impl From<CustomerArgs> for CustomerInfo {
    fn from(args: CustomerArgs) -> Self {
        CustomerInfo {
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            address: args.address,
            city: args.city,
            state: args.state,
            pincode: args.pincode,
        }
    }
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    #[command(flatten)]
    pub cart: CartArgs,

    #[command(flatten)]
    pub customer: CustomerArgs,

    /// Approve the card widget without prompting.
    #[arg(short = 'y', long)]
    pub auto_approve: bool,
}

/// Arguments for the redirect command.
#[derive(Args)]
pub struct RedirectArgs {
    #[command(subcommand)]
    pub command: RedirectCommand,
}

#[derive(Subcommand)]
pub enum RedirectCommand {
    /// The wallet reported success.
    Complete {
        /// Order id shown when the customer was redirected.
        order_id: String,
        /// Wallet transaction reference.
        #[arg(long)]
        payment_ref: String,
    },
    /// The customer came back without paying.
    Abandon {
        /// Order id shown when the customer was redirected.
        order_id: String,
    },
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Hash a password for the `[admin]` config section.
    HashPassword,
    /// Start an admin session.
    Login {
        /// Admin username (defaults to the configured one).
        #[arg(short, long)]
        username: Option<String>,
    },
    /// End an admin session.
    Logout {
        #[arg(long, env = "VERDANT_ADMIN_TOKEN")]
        token: String,
    },
    /// Wallet orders waiting for the customer to return.
    Pending {
        #[arg(long, env = "VERDANT_ADMIN_TOKEN")]
        token: String,
    },
    /// Settled orders.
    Orders {
        #[arg(long, env = "VERDANT_ADMIN_TOKEN")]
        token: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
