//! Checkout command.
//!
//! Walks the same shipping, payment and review steps as the web checkout.
//! PayPal cannot open its widget here: without `--paypal-capture-id` the
//! command prints the purchase unit to pay with, and with it records the
//! captured payment as an order.

use chrono::Utc;
use clap::Args;
use mangaverse_core::PaymentMethod;
use mangaverse_storefront::api::types::PaypalCapture;
use mangaverse_storefront::checkout::{CheckoutFlow, CheckoutStep, ShippingForm};
use mangaverse_storefront::shell::Route;
use mangaverse_storefront::stores::CartStore;
use tracing::info;

use super::{CommandError, Context};

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    full_name: String,

    #[arg(long)]
    address_line1: String,

    #[arg(long, default_value = "")]
    address_line2: String,

    #[arg(long)]
    city: String,

    #[arg(long, default_value = "")]
    state: String,

    #[arg(long, default_value = "")]
    postal_code: String,

    #[arg(long)]
    country: String,

    #[arg(long)]
    phone: String,

    /// creditCard, paypal, mpesa or cod
    #[arg(long)]
    method: PaymentMethod,

    #[arg(long, default_value = "")]
    card_number: String,

    /// MM/YY
    #[arg(long, default_value = "")]
    expiry: String,

    #[arg(long, env = "MANGAVERSE_CARD_CVV", hide_env_values = true, default_value = "")]
    cvv: String,

    /// 2547XXXXXXXX or 2541XXXXXXXX
    #[arg(long, default_value = "")]
    mpesa_phone: String,

    /// Id of a completed PayPal capture
    #[arg(long)]
    paypal_capture_id: Option<String>,

    #[arg(long, default_value = "COMPLETED")]
    paypal_status: String,

    #[arg(long)]
    paypal_update_time: Option<String>,

    #[arg(long)]
    paypal_payer_email: Option<String>,
}

/// Place an order for the current cart.
///
/// # Errors
///
/// Returns an error if the cart is empty, a step does not validate, or the
/// order is refused.
pub async fn run(ctx: &Context, args: CheckoutArgs) -> Result<(), CommandError> {
    let mut cart = ctx.cart();
    let auth = ctx.auth();
    let mut flow = ctx.checkout();

    if !flow.guard(&cart) {
        return Err(CommandError::Aborted("Nothing to check out."));
    }

    *flow.shipping_form_mut() = ShippingForm {
        full_name: args.full_name,
        address_line1: args.address_line1,
        address_line2: args.address_line2,
        city: args.city,
        state: args.state,
        postal_code: args.postal_code,
        country: args.country,
        phone: args.phone,
    };
    flow.next()?;

    flow.select_payment_method(args.method);
    let form = flow.payment_form_mut();
    form.card_number = args.card_number;
    form.expiry_date = args.expiry;
    form.cvv = args.cvv;
    form.mpesa_phone = args.mpesa_phone;

    if args.method == PaymentMethod::PayPal {
        let Some(capture_id) = args.paypal_capture_id else {
            let unit = flow.paypal_purchase_unit(&cart);
            info!(
                "Pay {} {} with PayPal ({}), then rerun with --paypal-capture-id.",
                unit.amount.value, unit.amount.currency_code, unit.description
            );
            return Ok(());
        };
        let capture = PaypalCapture {
            id: capture_id,
            status: args.paypal_status,
            update_time: args
                .paypal_update_time
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            email_address: args.paypal_payer_email,
        };
        let order_id = flow.approve_paypal(capture, &mut cart, &auth).await?;
        info!("Order confirmed: {}", Route::OrderConfirmation(order_id).path());
        return Ok(());
    }

    if flow.next()? != CheckoutStep::Review {
        return Err(CommandError::Aborted("Checkout did not reach review."));
    }
    log_review(&flow, &cart);

    let order_id = flow.submit(&mut cart, &auth).await?;
    info!("Order confirmed: {}", Route::OrderConfirmation(order_id).path());
    Ok(())
}

fn log_review(flow: &CheckoutFlow, cart: &CartStore) {
    info!("Step {}: {}", flow.step().number(), flow.step());
    for line in cart.items() {
        info!("  {} x{}  ${}", line.title, line.quantity, line.line_total().to_fixed());
    }
    if let Some(method) = flow.payment_form().method {
        info!("  Payment: {method}");
    }
    info!("  Total: ${}", cart.total_price().to_fixed());
}
