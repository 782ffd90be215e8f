use std::sync::Arc;

use reqwest::Method;
use shared::protocol::{AuthPayload, LoginRequest, RegisterRequest, User};
use tracing::{info, warn};

use crate::{
    error::{ClientError, ClientResult},
    session::{ClearReason, Session, SessionStore},
    transport::ApiClient,
};

/// Login, registration and logout on top of the session context.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &Arc<SessionStore> {
        self.api.session()
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let payload = self.authenticate("/auth/login", &request).await?;
        self.adopt(payload).await
    }

    pub async fn register(&self, profile: &RegisterRequest) -> ClientResult<User> {
        if profile.name.trim().is_empty()
            || profile.email.trim().is_empty()
            || profile.password.is_empty()
        {
            return Err(ClientError::validation("All fields are required"));
        }
        if profile.password != profile.password_confirmation {
            return Err(ClientError::validation("Passwords do not match"));
        }

        let payload = self.authenticate("/auth/register", profile).await?;
        self.adopt(payload).await
    }

    /// Server-side invalidation is best effort; local state is always cleared.
    pub async fn logout(&self) -> ClientResult<()> {
        if self.session().is_authenticated().await {
            if let Err(err) = self.api.post_empty("/auth/logout").await {
                if !err.is_unauthorized() {
                    warn!(error = %err, "server logout failed; clearing local session anyway");
                }
            }
        }
        self.session().clear(ClearReason::Logout).await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session().current_user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().is_authenticated().await
    }

    async fn authenticate<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<AuthPayload> {
        let builder = self.api.request(Method::POST, path)?.json(body);
        let response = self.api.send_credentials(builder, path).await?;
        ApiClient::decode(response, path).await
    }

    async fn adopt(&self, payload: AuthPayload) -> ClientResult<User> {
        let user = payload.user;
        self.session()
            .establish(Session {
                token: payload.token.access_token,
                user: user.clone(),
            })
            .await?;
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
