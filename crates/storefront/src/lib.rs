//! MangaVerse storefront library.
//!
//! Client-side state and flows of the MangaVerse manga shop, plus the small
//! server that sends transactional email.
//!
//! # Modules
//!
//! - [`stores`] - cart and session containers, persisted through [`storage`]
//! - [`checkout`] - the shipping / payment / review wizard
//! - [`api`] - HTTP client for the external MangaVerse API
//! - [`services`] - account, catalog and email services
//! - [`shell`] - notifications and navigation requested by the above
//! - [`routes`], [`state`], [`error`] - the axum server

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod shell;
pub mod state;
pub mod storage;
pub mod stores;
