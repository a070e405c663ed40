//! MangaVerse Core - Shared domain types.
//!
//! This crate provides the types used across all MangaVerse components:
//! - `storefront` - Cart/session stores, checkout flow and API client
//! - `cli` - Command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, payment fields and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
