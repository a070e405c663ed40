//! Cart commands.

use mangaverse_core::ProductId;
use mangaverse_storefront::stores::CartStore;
use tracing::info;

use super::{CommandError, Context};

pub fn show(ctx: &Context) {
    let cart = ctx.cart();
    if cart.is_empty() {
        info!("Your cart is empty.");
        return;
    }

    for line in cart.items() {
        info!(
            "{}  {} x{}  ${}",
            line.product_id,
            line.title,
            line.quantity,
            line.line_total().to_fixed()
        );
    }
    info!(
        "{} item(s), total ${}",
        cart.total_items(),
        cart.total_price().to_fixed()
    );
}

/// Add one copy of a product, fetched from the catalog.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched.
pub async fn add(ctx: &Context, id: &ProductId) -> Result<(), CommandError> {
    let catalog = ctx.catalog();
    let product = catalog.product(id).await?;
    if !product.in_stock() {
        return Err(CommandError::Aborted("That product is out of stock."));
    }
    catalog.add_to_cart(&mut ctx.cart(), &product);
    Ok(())
}

pub fn remove(ctx: &Context, id: &ProductId) {
    ctx.catalog().remove_from_cart(&mut ctx.cart(), id);
}

pub fn increase(ctx: &Context, id: &ProductId) {
    let mut cart = ctx.cart();
    cart.increase_quantity(id);
    log_line(&cart, id);
}

pub fn decrease(ctx: &Context, id: &ProductId) {
    let mut cart = ctx.cart();
    cart.decrease_quantity(id);
    log_line(&cart, id);
}

pub fn clear(ctx: &Context) {
    ctx.catalog().clear_cart(&mut ctx.cart());
}

fn log_line(cart: &CartStore, id: &ProductId) {
    match cart.line(id) {
        Some(line) => info!("{} x{}", line.title, line.quantity),
        None => info!("{id} is not in your cart."),
    }
}
