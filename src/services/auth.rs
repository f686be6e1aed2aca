use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{CredentialPair, SessionClient, SessionState, User};
use crate::error::ApiResult;
use crate::http::RequestDescriptor;

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_council_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

/// Account and session operations against `/auth`.
#[derive(Clone)]
pub struct AuthApi {
    session: Arc<SessionClient>,
}

impl AuthApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    /// Create a new practitioner account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        let response: RegisterResponse = self.session.post_json("/auth/register", request).await?;
        Ok(response.user)
    }

    /// Exchange email and password for a credential pair. On success the
    /// pair is persisted and the session transitions to Authenticated.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.session.set_state(SessionState::Authenticating).await;

        let request = RequestDescriptor::post("/auth/login").json(serde_json::json!({
            "email": email,
            "password": password,
        }));
        let payload: LoginResponse = match self.session.send_json(request).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "login failed");
                self.session.set_state(SessionState::Anonymous).await;
                return Err(e);
            }
        };

        let pair = CredentialPair::new(&payload.access_token, &payload.refresh_token);
        self.session.establish(&pair, payload.user.clone()).await?;
        Ok(payload.user)
    }

    /// Fetch the profile of the currently authenticated user.
    pub async fn current_user(&self) -> ApiResult<User> {
        self.session.get_json("/auth/me").await
    }

    /// Destroy the credential pair and return to the anonymous state.
    pub async fn logout(&self) -> ApiResult<()> {
        self.session.logout().await
    }
}
