//! Services built on the API client and the stores.
//!
//! - `account` - sign in, registration, password recovery, order history
//! - `catalog` - product browsing and cart actions
//! - `email` - welcome email rendering and SMTP delivery (server side)
//! - `welcome` - fire-and-forget welcome email trigger (client side)

pub mod account;
pub mod catalog;
pub mod email;
pub mod welcome;

pub use account::{AccountError, AccountService};
pub use catalog::CatalogService;
pub use email::{EmailService, MailError};
pub use welcome::WelcomeEmailTrigger;
