//! Catalog browsing and cart actions with their user-facing notifications.

use std::sync::Arc;

use mangaverse_core::ProductId;

use crate::api::types::Product;
use crate::api::{ApiClient, ApiError};
use crate::checkout::EMPTY_CART_MESSAGE;
use crate::error::add_breadcrumb;
use crate::shell::{Notification, Route, Shell};
use crate::stores::CartStore;

/// Shop, product page and cart page actions.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    shell: Arc<dyn Shell>,
}

impl CatalogService {
    pub fn new(api: ApiClient, shell: Arc<dyn Shell>) -> Self {
        Self { api, shell }
    }

    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.api.list_products().await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.api.product(id).await
    }

    pub fn add_to_cart(&self, cart: &mut CartStore, product: &Product) {
        cart.add_to_cart(product);
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
        self.shell
            .notify(Notification::success(format!("{} added to cart!", product.title)));
    }

    /// Remove a line. Unknown ids are ignored silently.
    pub fn remove_from_cart(&self, cart: &mut CartStore, product_id: &ProductId) {
        let Some(title) = cart.line(product_id).map(|line| line.title.clone()) else {
            return;
        };
        cart.remove_from_cart(product_id);
        self.shell
            .notify(Notification::error(format!("{title} removed from cart.")));
    }

    pub fn clear_cart(&self, cart: &mut CartStore) {
        cart.clear_cart();
        self.shell
            .notify(Notification::success("Your cart has been cleared!"));
    }

    /// Go to checkout unless the cart is empty.
    pub fn proceed_to_checkout(&self, cart: &CartStore) -> bool {
        if cart.is_empty() {
            self.shell.notify(Notification::error(EMPTY_CART_MESSAGE));
            return false;
        }
        self.shell.navigate(Route::Checkout);
        true
    }
}
