//! M-Pesa push payments.

use tracing::{info, instrument};

use super::types::{StkPushRequest, StkPushResponse};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Ask the provider to prompt the customer's phone for payment.
    ///
    /// Acceptance only means the prompt was delivered; see
    /// [`StkPushResponse::accepted`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token, request), fields(order_id = %request.order_id))]
    pub async fn stk_push(
        &self,
        token: &str,
        request: &StkPushRequest,
    ) -> Result<StkPushResponse, ApiError> {
        let response: StkPushResponse = self
            .send(
                self.post(&["mpesa", "stk-push"])?
                    .bearer_auth(token)
                    .json(request),
            )
            .await?;
        info!(accepted = response.accepted(), "STK push answered");
        Ok(response)
    }
}
