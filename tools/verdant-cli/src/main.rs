//! Verdant CLI - command line front end for the Verdant storefront core.
//!
//! Commands:
//! - `verdant catalog` - List products and coupons
//! - `verdant quote` - Price a cart for a payment method
//! - `verdant checkout` - Place an order
//! - `verdant redirect` - Complete or abandon a wallet payment
//! - `verdant admin` - Password hashing, sessions, pending orders
//! - `verdant config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{AdminArgs, CatalogArgs, CheckoutArgs, ConfigArgs, QuoteArgs, RedirectArgs};

/// Verdant CLI - price carts and run checkouts against the storefront core
#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products and coupons
    Catalog(CatalogArgs),

    /// Price a cart without placing an order
    Quote(QuoteArgs),

    /// Build a cart and pay for it
    Checkout(CheckoutArgs),

    /// Finish a wallet payment after the customer returns
    Redirect(RedirectArgs),

    /// Admin tools
    Admin(AdminArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("VERDANT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Redirect(args) => commands::redirect::run(args, &ctx).await,
        Commands::Admin(args) => commands::admin::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
