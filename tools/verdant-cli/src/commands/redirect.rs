//! Finish a wallet payment after the customer returns.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use verdant_commerce::cart::CartStore;
use verdant_commerce::checkout::{CachePendingOrders, RedirectReturn};
use verdant_commerce::OrderId;

use super::{RedirectArgs, RedirectCommand};
use crate::context::Context;
use crate::output::status_badge;
use crate::terminal::ReceiptPrinter;

/// Run the redirect command.
pub async fn run(args: RedirectArgs, ctx: &Context) -> Result<()> {
    let state_store = ctx.open_state()?;
    let ret = RedirectReturn::new(
        CartStore::shared(ctx.config.pricing.currency),
        Arc::new(CachePendingOrders::new(state_store.clone())),
        Arc::new(ReceiptPrinter::new(state_store, ctx.output.clone())),
    );

    match args.command {
        RedirectCommand::Complete {
            order_id,
            payment_ref,
        } => {
            let order = ret
                .complete(&OrderId::new(order_id.trim()), payment_ref.trim())
                .await?;
            ctx.output.success(&format!(
                "{} order {} for {}",
                status_badge("settled"),
                order.order_id,
                order.total
            ));
        }
        RedirectCommand::Abandon { order_id } => {
            let order_id = OrderId::new(order_id.trim());
            ret.abandon(&order_id).await?;
            if ctx.output.is_json() {
                ctx.output.json(&json!({ "status": "abandoned", "order_id": order_id }));
            } else {
                ctx.output.warn(&format!("Order {} abandoned", order_id));
            }
        }
    }

    Ok(())
}
