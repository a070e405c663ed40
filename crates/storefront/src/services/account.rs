//! Account flows: sign in, registration, password recovery, order history.
//!
//! Each operation reports its outcome to the user through the [`Shell`] and
//! also returns it, so callers can react programmatically.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mangaverse_core::UserId;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::api::types::OrderSummary;
use crate::api::{ApiClient, ApiError};
use crate::services::welcome::WelcomeEmailTrigger;
use crate::shell::{Notification, Route, Shell};
use crate::stores::auth::LOGIN_REDIRECT_DELAY;
use crate::stores::{AuthStore, Session, UserProfile};

/// Delay between a successful password reset and the redirect to login.
pub const RESET_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Special characters accepted (and one required) by the password policy.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+";

const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Errors from account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error(
        "Password must be at least 8 characters long and contain at least one uppercase letter, one lowercase letter, one number, and one special character (!@#$%^&*()_+)."
    )]
    WeakPassword,

    #[error("No reset token found in the URL. Please use the link from your email.")]
    MissingResetToken,

    #[error("Please log in to view your orders.")]
    NotAuthenticated,

    #[error("session token has no readable user id: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// True if `password` satisfies the reset policy: at least 8 characters, one
/// lowercase, one uppercase, one digit and one of [`PASSWORD_SPECIALS`], and
/// nothing outside those classes.
#[must_use]
pub fn meets_password_policy(password: &str) -> bool {
    let is_special = |c: char| PASSWORD_SPECIALS.contains(c);
    password.chars().count() >= 8
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_special(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_special)
}

#[derive(Deserialize)]
struct TokenClaims {
    id: UserId,
}

/// Read the user id from the `id` claim of a JWT, without verifying it.
fn user_id_from_token(token: &str) -> Result<UserId, AccountError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AccountError::InvalidToken("not a JWT".to_owned()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AccountError::InvalidToken(e.to_string()))?;
    let claims: TokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| AccountError::InvalidToken(e.to_string()))?;
    Ok(claims.id)
}

/// Account operations against the external API.
#[derive(Clone)]
pub struct AccountService {
    api: ApiClient,
    shell: Arc<dyn Shell>,
    welcome: WelcomeEmailTrigger,
}

impl AccountService {
    pub fn new(api: ApiClient, shell: Arc<dyn Shell>, welcome: WelcomeEmailTrigger) -> Self {
        Self {
            api,
            shell,
            welcome,
        }
    }

    /// Sign in. On success the [`AuthStore`] greets the user and heads home.
    ///
    /// # Errors
    ///
    /// Returns the API error after notifying the user.
    #[instrument(skip(self, auth, password))]
    pub async fn login(
        &self,
        auth: &mut AuthStore,
        email: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        let response = self
            .api
            .login(email.trim(), password)
            .await
            .map_err(|e| self.report(e, UNEXPECTED))?;

        auth.login(Session::new(
            UserProfile {
                id: response.id,
                name: response.name,
                email: response.email,
                role: response.role,
            },
            response.token,
        ));
        Ok(())
    }

    /// Create an account and sign in.
    ///
    /// The welcome email is requested in the background; the returned handle
    /// may be awaited or dropped.
    ///
    /// # Errors
    ///
    /// Returns an error after notifying the user if the passwords differ, the
    /// server refuses the account, or its token is unreadable.
    #[instrument(skip(self, auth, password, confirm))]
    pub async fn register(
        &self,
        auth: &mut AuthStore,
        name: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<JoinHandle<()>, AccountError> {
        if password != confirm {
            return Err(self.reject(AccountError::PasswordMismatch));
        }

        let response = self
            .api
            .register(name.trim(), email.trim(), password)
            .await
            .map_err(|e| self.report(e, UNEXPECTED))?;

        let id = user_id_from_token(&response.token).map_err(|e| {
            warn!(error = %e, "registration token unreadable");
            self.shell.notify(Notification::error(UNEXPECTED));
            e
        })?;

        let greeting = format!(
            "Registration successful! Welcome to MangaVerse, {}!",
            response.name
        );
        info!(user_id = %id, "account registered");
        auth.establish(Session::new(
            UserProfile {
                id,
                name: response.name,
                email: response.email,
                role: response.role,
            },
            response.token,
        ));
        self.shell.notify(Notification::success(greeting));

        let welcome = self.welcome.trigger(email.trim(), name.trim());
        self.shell.navigate_after(Route::Home, LOGIN_REDIRECT_DELAY);
        Ok(welcome)
    }

    /// Request a password reset link. Returns the message shown to the user.
    ///
    /// # Errors
    ///
    /// Returns the API error after notifying the user.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<String, AccountError> {
        let response = self
            .api
            .forgot_password(email.trim())
            .await
            .map_err(|e| self.report(e, UNEXPECTED))?;

        let message = response.message.unwrap_or_else(|| {
            "If an account with that email exists, a password reset link has been sent to your inbox."
                .to_owned()
        });
        self.shell.notify(Notification::success(message.clone()));
        Ok(message)
    }

    /// Set a new password using the token from the reset link.
    ///
    /// # Errors
    ///
    /// Returns an error after notifying the user. A missing token also sends
    /// the user back to the forgot-password page.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        reset_token: Option<&str>,
        password: &str,
        confirm: &str,
    ) -> Result<(), AccountError> {
        let Some(reset_token) = reset_token.filter(|t| !t.trim().is_empty()) else {
            let err = self.reject(AccountError::MissingResetToken);
            self.shell.navigate(Route::ForgotPassword);
            return Err(err);
        };
        if password != confirm {
            return Err(self.reject(AccountError::PasswordMismatch));
        }
        if !meets_password_policy(password) {
            return Err(self.reject(AccountError::WeakPassword));
        }

        let response = self
            .api
            .reset_password(reset_token.trim(), password)
            .await
            .map_err(|e| {
                self.report(
                    e,
                    "An unexpected error occurred during password reset. Please try again.",
                )
            })?;

        self.shell.notify(Notification::success(
            response
                .message
                .unwrap_or_else(|| "Password has been reset successfully!".to_owned()),
        ));
        self.shell.navigate_after(Route::Login, RESET_REDIRECT_DELAY);
        Ok(())
    }

    /// Orders of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error after notifying the user when signed out or when the
    /// request fails.
    #[instrument(skip_all)]
    pub async fn my_orders(&self, auth: &AuthStore) -> Result<Vec<OrderSummary>, AccountError> {
        let Some(token) = auth.bearer_token() else {
            return Err(self.reject(AccountError::NotAuthenticated));
        };

        self.api.my_orders(token).await.map_err(|e| {
            warn!(error = %e, "failed to load orders");
            self.shell
                .notify(Notification::error("Failed to load your orders."));
            AccountError::Api(e)
        })
    }

    fn reject(&self, error: AccountError) -> AccountError {
        self.shell.notify(Notification::error(error.to_string()));
        error
    }

    /// Notify "Error: {server message}", or `fallback` when the server gave none.
    fn report(&self, error: ApiError, fallback: &str) -> AccountError {
        warn!(error = %error, "account request failed");
        let message = error
            .server_message()
            .map_or_else(|| fallback.to_owned(), |m| format!("Error: {m}"));
        self.shell.notify(Notification::error(message));
        AccountError::Api(error)
    }
}
