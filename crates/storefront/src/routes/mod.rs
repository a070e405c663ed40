//! HTTP route handlers of the storefront server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Liveness check
//! POST /send-welcome-email  - Send the welcome email to a new customer
//! ```

pub mod email;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the application router (without state).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/send-welcome-email", post(email::send_welcome_email))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
