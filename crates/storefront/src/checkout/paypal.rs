//! PayPal widget callbacks.
//!
//! The PayPal widget creates and captures the payment itself. The flow only
//! supplies the purchase unit for `createOrder`, then records the captured
//! payment with the order service on approval.

use chrono::Utc;
use mangaverse_core::{CurrencyCode, OrderId, PaymentMethod};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{CheckoutError, CheckoutFlow, order_lines, validate_shipping};
use crate::api::types::{CreateOrderResponse, OrderRequest, PaypalCapture};
use crate::shell::Notification;
use crate::stores::{AuthStore, CartStore};

/// Currency of PayPal payments.
pub const PAYPAL_CURRENCY: CurrencyCode = CurrencyCode::USD;

/// Amount block of a purchase unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseAmount {
    pub value: String,
    pub currency_code: CurrencyCode,
}

/// What the widget's `createOrder` callback hands to PayPal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseUnit {
    pub amount: PurchaseAmount,
    pub description: String,
}

impl CheckoutFlow {
    /// Purchase unit for the current cart total.
    #[must_use]
    pub fn paypal_purchase_unit(&self, cart: &CartStore) -> PurchaseUnit {
        PurchaseUnit {
            amount: PurchaseAmount {
                value: cart.total_price().to_fixed(),
                currency_code: PAYPAL_CURRENCY,
            },
            description: format!("MangaVerse Order: {}", Utc::now().timestamp_millis()),
        }
    }

    /// Record a captured PayPal payment as an order.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] after notifying the user. The payment has
    /// already been captured at that point, so the user is asked to contact
    /// support when the server refuses the order.
    #[instrument(skip_all, fields(capture_id = %capture.id))]
    pub async fn approve_paypal(
        &mut self,
        capture: PaypalCapture,
        cart: &mut CartStore,
        auth: &AuthStore,
    ) -> Result<OrderId, CheckoutError> {
        self.shell
            .notify(Notification::success("Payment successful via PayPal!"));

        let token = self.require_order_context(cart, auth)?;
        let shipping = validate_shipping(&self.shipping_form).map_err(|e| self.reject(e))?;

        let request = OrderRequest {
            order_items: order_lines(cart),
            shipping_address: shipping,
            payment_method: PaymentMethod::PayPal,
            payment_details: None,
            payment_result: Some(capture),
            total_amount: cart.total_price(),
        };

        match self.api.create_order(token, &request).await {
            Ok(CreateOrderResponse {
                success: true,
                order: Some(order),
                ..
            }) => {
                info!(order_id = %order.id, "PayPal order placed");
                self.order_placed = true;
                self.finish(cart, &order.id);
                Ok(order.id)
            }
            Ok(response) => {
                warn!(message = ?response.message, "order refused after PayPal capture");
                self.shell.notify(Notification::error(
                    "Failed to create order after PayPal payment. Please contact support.",
                ));
                Err(CheckoutError::Rejected(
                    response.message.unwrap_or_else(|| "order not created".to_owned()),
                ))
            }
            Err(e) => {
                warn!(error = %e, "order request failed after PayPal capture");
                self.shell.notify(Notification::error(
                    "PayPal payment failed or was cancelled. Please try again.",
                ));
                Err(e.into())
            }
        }
    }

    /// The user closed the PayPal window.
    pub fn cancel_paypal(&self) {
        info!("PayPal payment cancelled");
        self.shell.notify(Notification::info("PayPal payment cancelled."));
    }

    /// The widget reported an error.
    pub fn paypal_error(&self, detail: &str) {
        warn!(detail, "PayPal widget error");
        self.shell.notify(Notification::error(
            "An error occurred with PayPal. Please try again.",
        ));
    }
}
