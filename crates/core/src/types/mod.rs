//! Core types for MangaVerse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::{CardDetails, CardExpiry, Cvv, MpesaPhone, PaymentFieldError};
pub use price::{CurrencyCode, Price, PriceError};
pub use status::*;
