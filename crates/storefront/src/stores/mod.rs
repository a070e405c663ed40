//! Client-side state containers.
//!
//! - [`cart::CartStore`] - line items and derived totals
//! - [`auth::AuthStore`] - the signed-in session
//!
//! Both are independent, hydrated once at start-up from a
//! [`Storage`](crate::storage::Storage) adapter, and expose a `subscribe()`
//! receiver that observes every committed change.

pub mod auth;
pub mod cart;

pub use auth::{AuthStore, Session, UserProfile};
pub use cart::{CartLineItem, CartProduct, CartStore};
