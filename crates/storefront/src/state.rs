//! Application state shared across handlers.

use std::sync::Arc;

use lettre::transport::smtp::Error as SmtpError;

use crate::config::StorefrontConfig;
use crate::services::EmailService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    email: Option<EmailService>,
}

impl AppState {
    /// Create the state, enabling email when SMTP is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay settings are invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, SmtpError> {
        let email = config
            .smtp
            .as_ref()
            .map(|smtp| EmailService::new(smtp, &config.site_url))
            .transpose()?;
        if email.is_none() {
            tracing::warn!("SMTP not configured; welcome emails will fail");
        }
        Ok(Self::with_email(config, email))
    }

    /// Create the state with an explicit email service.
    #[must_use]
    pub fn with_email(config: StorefrontConfig, email: Option<EmailService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, email }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The email service, when email is enabled.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
