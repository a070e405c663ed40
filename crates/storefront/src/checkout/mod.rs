//! Three-step checkout wizard.
//!
//! ```text
//!   Shipping --next()--> Payment --next()--> Review --submit()--> placed
//!      ^                   |  ^                 |
//!      +------back()-------+  +-----back()------+
//! ```
//!
//! The flow reads the [`CartStore`] and [`AuthStore`] it is handed, validates
//! each step before advancing, and places the order through the
//! [`ApiClient`]. PayPal never reaches `Review`: while it is selected on the
//! payment step the PayPal widget drives the order (see [`paypal`]).
//!
//! Every user-visible outcome goes through the injected [`Shell`]. Failed
//! validation or a rejected order leaves the flow and the cart untouched.

mod forms;
pub mod paypal;

use std::fmt;
use std::sync::Arc;

use mangaverse_core::{MpesaPhone, OrderId, PaymentMethod, Price};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::types::{CreateOrderResponse, OrderLine, OrderRequest, StkPushRequest};
use crate::api::{ApiClient, ApiError};
use crate::shell::{Notification, Route, Shell};
use crate::stores::{AuthStore, CartStore};

pub use forms::{
    PaymentForm, PaymentSelection, ShippingForm, ShippingInfo, ValidationError,
    validate_payment, validate_shipping,
};

/// Dismiss id of the "processing" notification.
pub const ORDER_TOAST_ID: &str = "orderProcessingToast";

/// Dismiss id of the M-Pesa push notification.
pub const MPESA_TOAST_ID: &str = "mpesaToast";

/// Shown by the entry guard when there is nothing to check out.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty. Please add items before checking out.";

/// Errors returned by [`CheckoutFlow::submit`] and the PayPal approval.
///
/// By the time one of these is returned the user has already been notified.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("order can only be submitted from the review step (currently {0})")]
    NotAtReview(CheckoutStep),

    #[error("cart is empty")]
    EmptyCart,

    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("PayPal orders are placed through the PayPal widget")]
    PaypalWidgetRequired,

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutStep {
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// 1-based step number, as shown in the progress indicator.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The checkout session.
pub struct CheckoutFlow {
    api: ApiClient,
    shell: Arc<dyn Shell>,
    step: CheckoutStep,
    shipping_form: ShippingForm,
    payment_form: PaymentForm,
    order_placed: bool,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new(api: ApiClient, shell: Arc<dyn Shell>) -> Self {
        Self {
            api,
            shell,
            step: CheckoutStep::Shipping,
            shipping_form: ShippingForm::default(),
            payment_form: PaymentForm::default(),
            order_placed: false,
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// True once an order has been accepted by the server.
    #[must_use]
    pub const fn order_placed(&self) -> bool {
        self.order_placed
    }

    #[must_use]
    pub const fn shipping_form(&self) -> &ShippingForm {
        &self.shipping_form
    }

    pub const fn shipping_form_mut(&mut self) -> &mut ShippingForm {
        &mut self.shipping_form
    }

    #[must_use]
    pub const fn payment_form(&self) -> &PaymentForm {
        &self.payment_form
    }

    pub const fn payment_form_mut(&mut self) -> &mut PaymentForm {
        &mut self.payment_form
    }

    pub const fn select_payment_method(&mut self, method: PaymentMethod) {
        self.payment_form.method = Some(method);
    }

    /// True while the PayPal widget should be mounted.
    #[must_use]
    pub fn paypal_active(&self) -> bool {
        self.step == CheckoutStep::Payment && self.payment_form.method == Some(PaymentMethod::PayPal)
    }

    /// Entry guard. Returns `false` and sends the user to the shop when a
    /// hydrated cart is empty and no order has been placed in this session.
    ///
    /// Before the cart has hydrated nothing is decided and `true` is returned.
    pub fn guard(&self, cart: &CartStore) -> bool {
        if !cart.is_hydrated() || self.order_placed || !cart.is_empty() {
            return true;
        }
        self.shell.notify(Notification::error(EMPTY_CART_MESSAGE));
        self.shell.navigate(Route::Shop);
        false
    }

    /// Validate the current step and advance.
    ///
    /// Returns the step the flow is on afterwards. Selecting PayPal on the
    /// payment step does not advance; the user is pointed at the PayPal
    /// button instead.
    ///
    /// # Errors
    ///
    /// Returns the validation failure, after notifying the user.
    pub fn next(&mut self) -> Result<CheckoutStep, ValidationError> {
        match self.step {
            CheckoutStep::Shipping => {
                validate_shipping(&self.shipping_form).map_err(|e| self.reject(e))?;
                self.step = CheckoutStep::Payment;
            }
            CheckoutStep::Payment => {
                match validate_payment(&self.payment_form).map_err(|e| self.reject(e))? {
                    PaymentSelection::PayPal => self.shell.notify(Notification::info(
                        "Please click the \"Pay with PayPal\" button to proceed.",
                    )),
                    _ => self.step = CheckoutStep::Review,
                }
            }
            CheckoutStep::Review => {}
        }
        Ok(self.step)
    }

    /// Go back one step. No-op on the first step.
    pub const fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Shipping | CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Review => CheckoutStep::Payment,
        };
        self.step
    }

    /// The validated shipping address, if the form is currently valid.
    #[must_use]
    pub fn shipping(&self) -> Option<ShippingInfo> {
        validate_shipping(&self.shipping_form).ok()
    }

    /// Place the order (card, M-Pesa or cash on delivery).
    ///
    /// On success the cart is cleared and the user is sent to the order
    /// confirmation. For M-Pesa a push payment is then requested; its
    /// outcome is reported separately and never undoes the order.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] after notifying the user. The cart and the
    /// current step are left as they were.
    #[instrument(skip_all, fields(method = ?self.payment_form.method))]
    pub async fn submit(
        &mut self,
        cart: &mut CartStore,
        auth: &AuthStore,
    ) -> Result<OrderId, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview(self.step));
        }
        let token = self.require_order_context(cart, auth)?;

        let selection = validate_payment(&self.payment_form).map_err(|e| self.reject(e))?;
        if selection == PaymentSelection::PayPal {
            self.shell.notify(Notification::info(
                "For PayPal, please click the \"Pay with PayPal\" button instead of Place Order.",
            ));
            return Err(CheckoutError::PaypalWidgetRequired);
        }
        let shipping = validate_shipping(&self.shipping_form).map_err(|e| self.reject(e))?;

        let total = cart.total_price();
        let request = OrderRequest {
            order_items: order_lines(cart),
            shipping_address: shipping,
            payment_method: selection.method(),
            payment_details: selection.card_details().cloned(),
            payment_result: None,
            total_amount: total,
        };

        self.shell
            .notify(Notification::loading(ORDER_TOAST_ID, "Processing your order..."));
        let outcome = self.api.create_order(token, &request).await;
        self.shell.dismiss(ORDER_TOAST_ID);

        let order_id = match outcome {
            Ok(CreateOrderResponse {
                success: true,
                order: Some(order),
                ..
            }) => order.id,
            Ok(response) => {
                let message = response.message.unwrap_or_else(|| "Server error".to_owned());
                warn!(%message, "order refused");
                self.shell
                    .notify(Notification::error(format!("Operation Failed: {message}")));
                return Err(CheckoutError::Rejected(message));
            }
            Err(e) => {
                warn!(error = %e, "order request failed");
                self.shell.notify(Notification::error(failure_message(&e)));
                return Err(e.into());
            }
        };

        info!(order_id = %order_id, "order placed");
        self.shell
            .notify(Notification::success("Order created successfully!"));
        self.order_placed = true;

        if let PaymentSelection::Mpesa(phone) = &selection {
            self.push_mpesa(token, phone, total, &order_id).await;
        }

        self.finish(cart, &order_id);
        Ok(order_id)
    }

    /// Common preconditions of placing an order: a non-empty cart and a
    /// signed-in user. Returns the bearer token.
    fn require_order_context<'a>(
        &self,
        cart: &CartStore,
        auth: &'a AuthStore,
    ) -> Result<&'a str, CheckoutError> {
        if cart.is_empty() {
            self.shell
                .notify(Notification::error("Your cart is empty! Cannot place an order."));
            self.shell.navigate(Route::Shop);
            return Err(CheckoutError::EmptyCart);
        }
        let Some(token) = auth.bearer_token() else {
            self.shell.notify(Notification::error(
                "You need to be logged in to place an order.",
            ));
            self.shell.navigate(Route::Login);
            return Err(CheckoutError::NotAuthenticated);
        };
        Ok(token)
    }

    async fn push_mpesa(&self, token: &str, phone: &MpesaPhone, amount: Price, order_id: &OrderId) {
        self.shell.notify(Notification::loading(
            MPESA_TOAST_ID,
            "Initiating M-Pesa STK Push...",
        ));
        let request = StkPushRequest {
            phone_number: phone.clone(),
            amount,
            order_id: order_id.clone(),
            description: format!("MangaVerse - Order: {order_id}"),
        };
        let outcome = self.api.stk_push(token, &request).await;
        self.shell.dismiss(MPESA_TOAST_ID);

        match outcome {
            Ok(response) if response.accepted() => self.shell.notify(Notification::success(
                "M-Pesa STK Push sent! Check your phone to complete payment.",
            )),
            Ok(response) => self.shell.notify(Notification::error(format!(
                "M-Pesa STK Push failed: {}",
                response.customer_message().unwrap_or("Unknown error")
            ))),
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "STK push failed");
                self.shell.notify(Notification::error(format!(
                    "M-Pesa STK Push failed: {}",
                    e.server_message().unwrap_or("Unknown error")
                )));
            }
        }
    }

    /// Clear the cart and show the confirmation.
    /// Stock changed on the server, so cached catalog reads are stale.
    fn finish(&self, cart: &mut CartStore, order_id: &OrderId) {
        self.api.invalidate_cache();
        cart.clear_cart();
        self.shell.navigate(Route::OrderConfirmation(order_id.clone()));
    }

    fn reject(&self, error: ValidationError) -> ValidationError {
        self.shell.notify(Notification::error(error.to_string()));
        error
    }
}

/// Order lines for the current cart contents.
fn order_lines(cart: &CartStore) -> Vec<OrderLine> {
    cart.items()
        .iter()
        .map(|item| OrderLine {
            product_id: item.product_id.clone(),
            name: item.title.clone(),
            quantity: item.quantity,
            price: item.price,
        })
        .collect()
}

/// User-facing text for a failed order request. Server responses read
/// "Operation Failed", local failures "Operation failed".
fn failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Server { message, .. } => {
            format!("Operation Failed: {}", message.as_deref().unwrap_or("Server error"))
        }
        ApiError::Unreachable(_) => {
            "Operation failed: No response from server. Check your internet connection."
                .to_owned()
        }
        other => format!("Operation failed: {other}"),
    }
}
