use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::auth::state::{SessionEvent, SessionState, User};
use crate::auth::store::{CredentialPair, CredentialStore};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpResponse, HttpTransport, Method, RequestBody, RequestDescriptor};

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Authenticated HTTP layer for the docket API.
///
/// Every outbound request goes through [`SessionClient::send`], which
/// attaches the stored access token as a bearer credential, transparently
/// refreshes it once when the server answers 401 (expired) or 422
/// (malformed), and replays the original request with the new token. An
/// unrecoverable authentication failure purges both stored tokens and
/// notifies subscribers; what happens next (typically a return to the
/// login view) is the subscriber's decision.
pub struct SessionClient {
    config: ApiConfig,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    /// Serializes refresh attempts so concurrent requests that all hit an
    /// expired token produce a single refresh call.
    refresh_gate: Mutex<()>,
}

impl SessionClient {
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            transport,
            store,
            state: RwLock::new(SessionState::Anonymous),
            events,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Subscribe to session lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub(crate) async fn set_state(&self, state: SessionState) {
        {
            let mut current = self.state.write().await;
            if *current == state {
                return;
            }
            *current = state.clone();
        }
        let _ = self.events.send(SessionEvent::StateChanged { state });
    }

    /// Store a freshly issued credential pair and mark the session
    /// authenticated. Called by the auth service after a successful login.
    pub(crate) async fn establish(&self, pair: &CredentialPair, user: User) -> ApiResult<()> {
        self.store.store_pair(pair).await?;
        info!(user_id = user.id, "session established");
        self.set_state(SessionState::Authenticated { user }).await;
        Ok(())
    }

    /// Destroy the credential pair and return to the anonymous state.
    pub async fn logout(&self) -> ApiResult<()> {
        self.store.purge().await?;
        info!("session ended, credentials removed");
        self.set_state(SessionState::Anonymous).await;
        Ok(())
    }

    /// Issue a request with bearer-token attachment and a single
    /// refresh-and-replay on 401/422.
    ///
    /// Pre-flight: a stored access token that is blank is treated as
    /// corrupt; both tokens are purged and the call fails with
    /// [`ApiError::InvalidCredential`] before any network I/O. A request
    /// with no stored token dispatches without an Authorization header.
    pub async fn send(&self, mut request: RequestDescriptor) -> ApiResult<HttpResponse> {
        let mut bearer = match self.store.access_token().await? {
            Some(token) if token.trim().is_empty() => {
                warn!("stored access token is blank, purging credentials");
                self.invalidate_credentials("malformed access token").await?;
                return Err(ApiError::InvalidCredential);
            }
            other => other,
        };

        loop {
            let response = self.dispatch(&request, bearer.as_deref()).await?;
            if response.is_success() {
                return Ok(response);
            }

            let error = ApiError::from_status(response.status(), response.body());
            if !error.is_auth_failure() || request.retried {
                return Err(error);
            }

            // One refresh per request; the replay is never refreshed again.
            request.retried = true;
            let Some(refresh_token) = self.store.refresh_token().await? else {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    "auth failure with no refresh token, purging credentials"
                );
                self.invalidate_credentials("no refresh token available")
                    .await?;
                return Err(error);
            };

            let stale = bearer.take().unwrap_or_default();
            let fresh = self.refresh_access_token(&refresh_token, &stale).await?;
            debug!(
                method = %request.method,
                path = %request.path,
                "replaying request with refreshed access token"
            );
            bearer = Some(fresh);
        }
    }

    /// Issue a request and decode the response body as JSON.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> ApiResult<T> {
        self.send(request).await?.json()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(RequestDescriptor::get(path)).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        let request = RequestDescriptor::post(path).json(serde_json::to_value(body)?);
        self.send_json(request).await
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        let request = RequestDescriptor::put(path).json(serde_json::to_value(body)?);
        self.send_json(request).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(RequestDescriptor::delete(path)).await?;
        Ok(())
    }

    /// Single dispatch of a request with an optional bearer credential.
    async fn dispatch(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> ApiResult<HttpResponse> {
        let url = self.config.endpoint(&request.path);
        let mut headers = request.headers.clone();
        if let Some(token) = bearer {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        self.transport
            .execute(request.method, &url, &headers, &request.body)
            .await
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Refresh attempts are serialized behind `refresh_gate`: a task that
    /// acquires the gate after a concurrent request already refreshed will
    /// find the stored access token changed from the one it sent and reuse
    /// it instead of issuing another refresh call. The refresh request goes
    /// straight to the transport so it can never trigger itself.
    ///
    /// On any failure both stored tokens are purged and the returned
    /// [`ApiError::RefreshFailed`] replaces the error that triggered the
    /// refresh.
    async fn refresh_access_token(&self, refresh_token: &str, stale: &str) -> ApiResult<String> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.store.access_token().await? {
            if !current.is_empty() && current != stale {
                debug!("reusing access token refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let url = self.config.endpoint("/auth/refresh");
        let headers = [(
            "Authorization".to_string(),
            format!("Bearer {}", refresh_token),
        )];
        let outcome = self
            .transport
            .execute(Method::Post, &url, &headers, &RequestBody::Empty)
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh call failed, purging credentials");
                self.invalidate_credentials("token refresh failed").await?;
                return Err(ApiError::RefreshFailed {
                    message: e.to_string(),
                });
            }
        };

        if !response.is_success() {
            warn!(
                status = response.status(),
                "token refresh rejected, purging credentials"
            );
            let message = crate::error::server_message(response.body());
            self.invalidate_credentials("token refresh rejected").await?;
            return Err(ApiError::RefreshFailed { message });
        }

        let payload: RefreshResponse = response.json()?;
        self.store.store_access_token(&payload.access_token).await?;
        info!("access token refreshed");
        Ok(payload.access_token)
    }

    /// Purge both stored tokens, drop any authenticated user, and notify
    /// subscribers. The only automatic recovery action this layer takes.
    async fn invalidate_credentials(&self, reason: &str) -> ApiResult<()> {
        self.store.purge().await?;
        self.set_state(SessionState::Anonymous).await;
        let _ = self.events.send(SessionEvent::CredentialsInvalidated {
            reason: reason.to_string(),
        });
        Ok(())
    }
}
