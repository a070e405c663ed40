//! Account endpoints under `/users`.

use tracing::instrument;

use super::types::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.send(
            self.post(&["users", "login"])?
                .json(&LoginRequest { email, password }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the server refuses the account.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        self.send(self.post(&["users", "register"])?.json(&RegisterRequest {
            name,
            email,
            password,
        }))
        .await
    }

    /// Ask for a reset link. The server answers the same way whether or not
    /// the account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        self.send(
            self.post(&["users", "forgot-password"])?
                .json(&ForgotPasswordRequest { email }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the reset token is invalid.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.send(
            self.put(&["users", "reset-password", reset_token])?
                .json(&ResetPasswordRequest { password }),
        )
        .await
    }
}
