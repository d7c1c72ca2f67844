use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestOptions};
use crate::transport::Transport;
use crate::types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, ResetPasswordRequest,
    TokenPair, User,
};

/// Session endpoints under `/auth`.
pub struct Auth<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Auth<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.client.post("/auth/login", credentials).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client
            .send_unit("/auth/logout", &RequestOptions::new(HttpMethod::Post))
            .await
    }

    /// The account the current token belongs to.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get("/auth/me").await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        self.client
            .post(
                "/auth/refresh",
                &RefreshRequest {
                    refresh_token: refresh_token.to_string(),
                },
            )
            .await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.client.post_unit("/auth/change-password", request).await
    }

    /// Asks the backend to mail a reset link.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.client.post_unit("/auth/reset-password", request).await
    }
}
