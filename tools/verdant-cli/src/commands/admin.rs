//! Admin tools: password hashing, sessions and order listings.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use dialoguer::Password;
use serde_json::json;
use verdant_auth::{AdminAuthority, AuthSession, PasswordHasher, SessionToken};
use verdant_cache::Cache;
use verdant_commerce::cart::CartStore;
use verdant_commerce::checkout::{CachePendingOrders, CheckoutOrder, RedirectReturn};
use verdant_commerce::orders::OrderBook;

use super::{AdminArgs, AdminCommand};
use crate::context::Context;
use crate::output::status_badge;
use crate::terminal::{ReceiptPrinter, RECEIPT_NAMESPACE};

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AdminCommand::HashPassword => hash_password(ctx),
        AdminCommand::Login { username } => login(username, ctx),
        AdminCommand::Logout { token } => logout(&token, ctx),
        AdminCommand::Pending { token } => pending(&token, ctx).await,
        AdminCommand::Orders { token } => orders(&token, ctx).await,
    }
}

fn authority(ctx: &Context) -> Result<(AdminAuthority, Arc<Cache>)> {
    let state_store = ctx.open_state()?;
    Ok((
        AdminAuthority::new(ctx.config.admin.clone(), state_store.clone()),
        state_store,
    ))
}

fn hash_password(ctx: &Context) -> Result<()> {
    let password = Password::new()
        .with_prompt("New admin password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;
    PasswordHasher::validate_password(&password)?;

    let hash = PasswordHasher::new().hash(&password)?;
    if ctx.output.is_json() {
        ctx.output.json(&json!({ "password_hash": hash }));
    } else {
        ctx.output.success("Add this to the [admin] section of verdant.toml:");
        println!("password_hash = \"{}\"", hash);
    }
    Ok(())
}

fn login(username: Option<String>, ctx: &Context) -> Result<()> {
    if ctx.config.admin.password_hash.is_empty() {
        bail!("No admin password configured. Run `verdant admin hash-password` first.");
    }
    let username = username.unwrap_or_else(|| ctx.config.admin.username.clone());
    let password = Password::new()
        .with_prompt(format!("Password for {}", username))
        .interact()?;

    let (authority, _) = authority(ctx)?;
    let session = authority
        .login(&username, &password)
        .context("Admin login failed")?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "token": session.token,
            "username": session.username,
            "expires_at": session.expires_at,
        }));
        return Ok(());
    }
    ctx.output.success(&format!("Logged in as {}", session.username));
    ctx.output.kv("Expires", &session.expires_at.to_rfc3339());
    println!("{}", session.token);
    ctx.output
        .info("Pass it with --token or export VERDANT_ADMIN_TOKEN");
    Ok(())
}

fn logout(token: &str, ctx: &Context) -> Result<()> {
    let (authority, _) = authority(ctx)?;
    authority.logout(&SessionToken::new(token))?;
    ctx.output.success("Logged out");
    Ok(())
}

fn session(token: &str, ctx: &Context) -> Result<(AuthSession, Arc<Cache>)> {
    let (authority, state_store) = authority(ctx)?;
    let session = authority
        .authorize(&SessionToken::new(token))
        .context("Admin session rejected, log in again")?;
    Ok((session, state_store))
}

async fn pending(token: &str, ctx: &Context) -> Result<()> {
    let (session, state_store) = session(token, ctx)?;
    let ret = RedirectReturn::new(
        CartStore::shared(ctx.config.pricing.currency),
        Arc::new(CachePendingOrders::new(state_store.clone())),
        Arc::new(ReceiptPrinter::new(state_store, ctx.output.clone())),
    );
    let orders = ret.pending(&session).await?;
    print_orders(ctx, "Pending wallet orders", &orders, "pending");
    Ok(())
}

async fn orders(token: &str, ctx: &Context) -> Result<()> {
    let (session, state_store) = session(token, ctx)?;
    let mut receipts = Vec::new();
    for key in state_store.keys_with_prefix(&format!("{RECEIPT_NAMESPACE}:"))? {
        if let Some(order) = state_store.get::<CheckoutOrder>(&key)? {
            receipts.push(order);
        }
    }
    let book = OrderBook::from_orders(receipts);
    let orders = book.list(&session).await?;
    print_orders(ctx, "Settled orders", &orders, "settled");
    Ok(())
}

fn print_orders(ctx: &Context, title: &str, orders: &[CheckoutOrder], status: &str) {
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return;
    }

    ctx.output.header(title);
    if orders.is_empty() {
        ctx.output.info("None");
        return;
    }
    let widths = [24, 20, 10, 10, 20];
    ctx.output
        .table_row(&["Order", "Placed", "Total", "Status", "Customer"], &widths);
    for order in orders {
        let placed = order.placed_at.format("%Y-%m-%d %H:%M").to_string();
        let total = order.total.display();
        let badge = status_badge(status);
        let customer = order.customer.full_name();
        ctx.output.table_row(
            &[order.order_id.as_str(), &placed, &total, &badge, &customer],
            &widths,
        );
    }
}
