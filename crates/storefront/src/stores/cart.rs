//! Shopping cart store.
//!
//! Holds the cart's line items in insertion order, persists them through a
//! [`Storage`] adapter and publishes every committed snapshot to subscribers.
//!
//! # Invariants
//!
//! - at most one line per product
//! - every line has `quantity >= 1`
//! - totals are derived from the lines on each call, never cached
//!
//! # Hydration
//!
//! A new store is empty and *not hydrated*. Nothing is written to storage
//! until [`CartStore::hydrate`] has loaded the previously saved cart, so the
//! empty start-up state can never overwrite a saved cart.

use std::sync::Arc;

use mangaverse_core::{Price, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::types::Product;
use crate::storage::Storage;

/// Storage key of the serialized cart.
pub const CART_KEY: &str = "cartItems";

/// One product and its quantity within the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub cover_image: String,
    pub quantity: u32,
}

impl CartLineItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// The product fields a cart line is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub product_id: ProductId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub cover_image: String,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            author: product.author.clone(),
            price: product.price,
            cover_image: product.cover_image.clone(),
        }
    }
}

/// Client-side cart state container.
pub struct CartStore {
    storage: Arc<dyn Storage>,
    items: Vec<CartLineItem>,
    hydrated: bool,
    /// Cleared when the saved cart could not be read, so it is never overwritten.
    persist: bool,
    tx: watch::Sender<Vec<CartLineItem>>,
}

impl CartStore {
    /// Create an empty, not yet hydrated store.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            storage,
            items: Vec::new(),
            hydrated: false,
            persist: true,
            tx,
        }
    }

    /// Create a store and immediately hydrate it.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Load the saved cart. Only the first call has any effect.
    ///
    /// A saved cart that fails to parse is discarded and its key removed; the
    /// store then starts empty. If storage cannot be read at all the store
    /// starts empty and stops persisting for its lifetime.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        match self.storage.get(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
                Ok(saved) => {
                    self.items = normalize(saved);
                    debug!(lines = self.items.len(), "cart restored from storage");
                }
                Err(e) => {
                    warn!(error = %e, "discarding corrupt saved cart");
                    if let Err(e) = self.storage.remove(CART_KEY) {
                        warn!(error = %e, "failed to clear corrupt saved cart");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to read saved cart; cart changes will not be saved");
                self.persist = false;
            }
        }

        self.hydrated = true;
        self.tx.send_replace(self.items.clone());
    }

    /// Whether [`Self::hydrate`] has run.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for `product_id`.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Observe committed cart snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLineItem>> {
        self.tx.subscribe()
    }

    /// Add one unit of `product`: bumps an existing line or appends a new one.
    pub fn add_to_cart(&mut self, product: impl Into<CartProduct>) {
        let product = product.into();
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.product_id)
        {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(CartLineItem {
                product_id: product.product_id,
                title: product.title,
                author: product.author,
                price: product.price,
                cover_image: product.cover_image,
                quantity: 1,
            });
        }
        self.commit();
    }

    /// Remove the line for `product_id`, if any.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        if self.items.len() != before {
            self.commit();
        }
    }

    /// Add one unit to an existing line.
    pub fn increase_quantity(&mut self, product_id: &ProductId) {
        if let Some(item) = self.line_mut(product_id) {
            item.quantity = item.quantity.saturating_add(1);
            self.commit();
        }
    }

    /// Remove one unit from an existing line, never going below 1.
    pub fn decrease_quantity(&mut self, product_id: &ProductId) {
        if let Some(item) = self.line_mut(product_id) {
            item.quantity = item.quantity.saturating_sub(1).max(1);
        }
        self.items.retain(|item| item.quantity > 0);
        self.commit();
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.commit();
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }

    /// Publish the current snapshot and, once hydrated, persist it.
    fn commit(&self) {
        self.tx.send_replace(self.items.clone());

        if !self.hydrated || !self.persist {
            return;
        }
        match serde_json::to_string(&self.items) {
            Ok(json) => {
                if let Err(e) = self.storage.set(CART_KEY, &json) {
                    warn!(error = %e, "failed to persist cart");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize cart"),
        }
    }
}

/// Re-establish the line invariants on data read from storage: zero-quantity
/// lines are dropped and duplicate products merged into their first line.
fn normalize(saved: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut items: Vec<CartLineItem> = Vec::with_capacity(saved.len());
    for line in saved.into_iter().filter(|line| line.quantity > 0) {
        if let Some(existing) = items
            .iter_mut()
            .find(|item| item.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            items.push(line);
        }
    }
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::storage::test_support::UnreadableStorage;

    fn product(id: &str, cents: i64) -> CartProduct {
        CartProduct {
            product_id: ProductId::new(id),
            title: format!("Volume {id}"),
            author: "Eiichiro Oda".to_string(),
            price: Price::from_cents(cents).unwrap(),
            cover_image: format!("https://img.example.com/{id}.jpg"),
        }
    }

    fn hydrated_store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(storage.clone());
        (storage, store)
    }

    #[test]
    fn repeated_adds_make_one_line() {
        let (_, mut cart) = hydrated_store();
        for _ in 0..5 {
            cart.add_to_cart(product("A", 1000));
        }
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.line(&ProductId::new("A")).unwrap().quantity, 5);
    }

    #[test]
    fn totals_for_mixed_cart() {
        let (_, mut cart) = hydrated_store();
        cart.add_to_cart(product("A", 1000));
        cart.add_to_cart(product("A", 1000));
        cart.add_to_cart(product("B", 500));

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Price::from_cents(2500).unwrap());
    }

    #[test]
    fn totals_follow_every_mutation() {
        let (_, mut cart) = hydrated_store();
        let a = ProductId::new("A");
        cart.add_to_cart(product("A", 1250));
        cart.increase_quantity(&a);
        assert_eq!(cart.total_price(), Price::from_cents(2500).unwrap());

        cart.decrease_quantity(&a);
        assert_eq!(cart.total_price(), Price::from_cents(1250).unwrap());

        cart.remove_from_cart(&a);
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn decrease_never_goes_below_one() {
        let (_, mut cart) = hydrated_store();
        let a = ProductId::new("A");
        cart.add_to_cart(product("A", 100));
        for _ in 0..4 {
            cart.decrease_quantity(&a);
        }
        assert_eq!(cart.line(&a).unwrap().quantity, 1);
        assert!(cart.items().iter().all(|item| item.quantity >= 1));
    }

    #[test]
    fn mutations_on_missing_products_are_noops() {
        let (_, mut cart) = hydrated_store();
        cart.add_to_cart(product("A", 100));
        let missing = ProductId::new("missing");
        cart.remove_from_cart(&missing);
        cart.increase_quantity(&missing);
        cart.decrease_quantity(&missing);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn insertion_order_is_kept() {
        let (_, mut cart) = hydrated_store();
        cart.add_to_cart(product("C", 100));
        cart.add_to_cart(product("A", 100));
        cart.add_to_cart(product("C", 100));
        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A"]);
    }

    #[test]
    fn snapshot_roundtrips_through_storage() {
        let (storage, mut cart) = hydrated_store();
        cart.add_to_cart(product("A", 1099));
        cart.add_to_cart(product("B", 550));
        cart.increase_quantity(&ProductId::new("B"));

        let reloaded = CartStore::load(storage);
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total_price(), cart.total_price());
    }

    #[test]
    fn nothing_is_written_before_hydration() {
        let saved = serde_json::to_string(&vec![CartLineItem {
            product_id: ProductId::new("saved"),
            title: "Saved".to_string(),
            author: "Someone".to_string(),
            price: Price::from_cents(700).unwrap(),
            cover_image: String::new(),
            quantity: 2,
        }])
        .unwrap();
        let storage = Arc::new(MemoryStorage::with_entries([(CART_KEY, saved.clone())]));

        let mut cart = CartStore::new(storage.clone());
        cart.clear_cart();
        assert_eq!(storage.get(CART_KEY).unwrap(), Some(saved));

        cart.hydrate();
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn hydrate_runs_once() {
        let (storage, mut cart) = hydrated_store();
        cart.add_to_cart(product("A", 100));
        storage.set(CART_KEY, "[]").unwrap();
        cart.hydrate();
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn corrupt_cart_loads_empty_and_resets_storage() {
        let storage = Arc::new(MemoryStorage::with_entries([(CART_KEY, "{not json")]));
        let cart = CartStore::load(storage.clone());
        assert!(cart.is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn unreadable_storage_never_overwrites_saved_cart() {
        let saved = r#"[{"productId":"A","title":"A","author":"x","price":1.5,"coverImage":"","quantity":2}]"#;
        let storage = Arc::new(UnreadableStorage::with_entries([(CART_KEY, saved)]));

        let mut cart = CartStore::load(storage.clone());
        assert!(cart.is_hydrated());
        assert!(cart.is_empty());
        assert_eq!(storage.saved(CART_KEY).as_deref(), Some(saved));

        cart.add_to_cart(product("B", 100));
        cart.clear_cart();
        assert_eq!(storage.saved(CART_KEY).as_deref(), Some(saved));
    }

    #[test]
    fn saved_lines_are_normalized() {
        let raw = r#"[
            {"productId":"A","title":"A","author":"x","price":1.5,"coverImage":"","quantity":1},
            {"productId":"B","title":"B","author":"x","price":2,"coverImage":"","quantity":0},
            {"productId":"A","title":"A","author":"x","price":1.5,"coverImage":"","quantity":2}
        ]"#;
        let storage = Arc::new(MemoryStorage::with_entries([(CART_KEY, raw)]));
        let cart = CartStore::load(storage);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn subscribers_see_each_commit() {
        let (_, mut cart) = hydrated_store();
        let rx = cart.subscribe();
        cart.add_to_cart(product("A", 100));
        assert_eq!(rx.borrow().len(), 1);
        cart.clear_cart();
        assert!(rx.borrow().is_empty());
    }
}
