//! Build a cart and pay for it.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::json;
use tokio::sync::watch;
use verdant_commerce::checkout::{
    CachePendingOrders, CheckoutOrchestrator, CheckoutOutcome, CheckoutPhase, CustomerInfo,
};
use verdant_commerce::CheckoutError;

use super::quote::print_bill;
use super::{build_cart, CheckoutArgs};
use crate::context::Context;
use crate::output::{status_badge, Output};
use crate::terminal::{PromptGateway, ReceiptPrinter, SimulatedUpi, SimulatedWallet};

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let (cart, state) = build_cart(&args.cart, ctx).await?;
    let state_store = ctx.open_state()?;
    let sim = &ctx.config.simulator;

    let orchestrator = CheckoutOrchestrator::new(
        cart,
        Arc::new(CachePendingOrders::new(state_store.clone())),
        Arc::new(ReceiptPrinter::new(state_store, ctx.output.clone())),
    )
    .with_gateway(Arc::new(PromptGateway::new(args.auto_approve)))
    .with_wallet(Arc::new(SimulatedWallet::new(sim.wallet_url.as_str())))
    .with_upi(Arc::new(SimulatedUpi::new(sim.upi_polls_to_success)))
    .with_pricing(ctx.config.pricing.clone())
    .with_config(ctx.config.checkout.clone());
    orchestrator.select_provider(args.cart.provider)?;

    let quote = orchestrator.quote().await;
    if !ctx.output.is_json() {
        ctx.output.header("Checkout");
        print_bill(&ctx.output, &state, &quote, ctx.config.pricing.tax_rate_bps);
    }

    let customer = CustomerInfo::from(args.customer);
    let progress = tokio::spawn(follow_phases(orchestrator.subscribe(), ctx.output.clone()));

    let result = {
        let pay = orchestrator.pay(&customer);
        tokio::pin!(pay);
        tokio::select! {
            result = &mut pay => result,
            _ = tokio::signal::ctrl_c() => {
                orchestrator.cancel();
                pay.await
            }
        }
    };
    // Dropping the orchestrator closes the phase channel and ends the follower.
    drop(orchestrator);
    let _ = progress.await;

    match result {
        Ok(CheckoutOutcome::Settled(order)) => {
            ctx.output.success(&format!(
                "{} order {} for {}",
                status_badge("settled"),
                order.order_id,
                order.total
            ));
            Ok(())
        }
        Ok(CheckoutOutcome::Redirected {
            order_id,
            redirect_url,
        }) => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "status": "redirected",
                    "order_id": order_id,
                    "redirect_url": redirect_url,
                }));
                return Ok(());
            }
            ctx.output.info(&format!(
                "{} continue payment at {}",
                status_badge("redirected"),
                redirect_url
            ));
            ctx.output.kv("Order", order_id.as_str());
            ctx.output.info(&format!(
                "When the wallet returns, run `verdant redirect complete {} --payment-ref <ref>`",
                order_id
            ));
            Ok(())
        }
        Err(CheckoutError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                ctx.output
                    .error(&format!("{}: {}", field.display_name(), message));
            }
            bail!("Customer details are incomplete ({} field(s))", errors.len())
        }
        Err(CheckoutError::Cancelled) => {
            ctx.output.warn("Payment cancelled, nothing was charged");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Show a spinner while a UPI payment is being polled.
async fn follow_phases(mut phases: watch::Receiver<CheckoutPhase>, output: Output) {
    let mut spinner = None;
    while phases.changed().await.is_ok() {
        let phase = phases.borrow_and_update().clone();
        match phase {
            CheckoutPhase::Polling {
                intent_url,
                attempt,
                max_attempts,
            } => {
                let pb = spinner.get_or_insert_with(|| {
                    output.info(&format!("Scan or open {}", intent_url));
                    output.spinner("Waiting for UPI payment")
                });
                pb.set_message(format!(
                    "Waiting for UPI payment (check {}/{})",
                    attempt, max_attempts
                ));
            }
            other => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                output.debug(&format!("checkout {}", other.as_str()));
            }
        }
    }
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}
