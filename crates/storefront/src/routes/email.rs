//! Welcome email route.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::api::types::WelcomeEmailRequest;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Message returned when the welcome email was handed to the relay.
pub const WELCOME_EMAIL_SENT: &str = "Welcome email sent successfully!";

/// JSON `{message}` body.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// `POST /send-welcome-email`
///
/// Responds `200 {"message": "Welcome email sent successfully!"}`, or `500
/// {"message": "Failed to send welcome email."}` when sending fails.
#[instrument(skip_all)]
pub async fn send_welcome_email(
    State(state): State<AppState>,
    Json(request): Json<WelcomeEmailRequest>,
) -> Result<Json<MessageBody>> {
    let recipient = request.recipient_email.trim();
    if recipient.is_empty() {
        return Err(AppError::BadRequest("recipientEmail is required".to_string()));
    }

    let email = state.email().ok_or(AppError::MailDisabled)?;
    email
        .send_welcome_email(recipient, request.recipient_name.trim())
        .await?;

    Ok(Json(MessageBody {
        message: WELCOME_EMAIL_SENT,
    }))
}
