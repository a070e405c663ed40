//! Order history.

use tracing::info;

use super::{CommandError, Context};

/// List the signed-in user's orders.
///
/// # Errors
///
/// Returns an error when signed out or when the request fails.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let orders = ctx.account()?.my_orders(&ctx.auth()).await?;
    if orders.is_empty() {
        info!("You have not placed any orders yet.");
        return Ok(());
    }

    for order in &orders {
        info!(
            "{}  {}  {}  {}  ${}",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            order.status,
            order.payment_method.map_or("Other", |method| method.label()),
            order.total_amount.to_fixed()
        );
        for line in &order.order_items {
            info!("    {} x{}  ${}", line.name, line.quantity, line.price.to_fixed());
        }
    }
    Ok(())
}
