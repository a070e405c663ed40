//! Fire-and-forget welcome email trigger.
//!
//! After registration the client asks the storefront server to send the
//! welcome email. The request runs as its own task; failures are logged and
//! never reach the user.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

use crate::api::ApiError;
use crate::api::types::WelcomeEmailRequest;

/// Path of the welcome email route, relative to the site URL.
pub const WELCOME_EMAIL_PATH: &str = "send-welcome-email";

/// Posts welcome email requests to the storefront server.
#[derive(Clone)]
pub struct WelcomeEmailTrigger {
    client: reqwest::Client,
    endpoint: Url,
}

impl WelcomeEmailTrigger {
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built or the HTTP
    /// client fails to build.
    pub fn new(site_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let endpoint = site_url
            .join(WELCOME_EMAIL_PATH)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{site_url}: {e}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Spawn the request. The returned handle may be dropped.
    pub fn trigger(&self, recipient_email: &str, recipient_name: &str) -> JoinHandle<()> {
        let request = self.client.post(self.endpoint.clone()).json(&WelcomeEmailRequest {
            recipient_email: recipient_email.to_owned(),
            recipient_name: recipient_name.to_owned(),
        });

        tokio::spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!("welcome email requested");
                }
                Ok(response) => {
                    warn!(status = response.status().as_u16(), "welcome email request refused");
                }
                Err(e) => warn!(error = %e, "failed to trigger welcome email"),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn posts_recipient_to_site_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send-welcome-email"))
            .and(body_json(json!({
                "recipientEmail": "chopper@strawhats.sea",
                "recipientName": "Tony Tony Chopper"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let site = Url::parse(&server.uri()).unwrap();
        let trigger = WelcomeEmailTrigger::new(&site, Duration::from_secs(5)).unwrap();
        trigger
            .trigger("chopper@strawhats.sea", "Tony Tony Chopper")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failures_stay_inside_the_task() {
        let site = Url::parse("http://127.0.0.1:9").unwrap();
        let trigger = WelcomeEmailTrigger::new(&site, Duration::from_secs(1)).unwrap();
        assert!(trigger.trigger("a@b.co", "A").await.is_ok());
    }
}
