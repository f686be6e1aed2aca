//! Async client for the Docket case-management REST API.
//!
//! The core of the crate is [`SessionClient`]: it attaches the stored
//! access token to every outbound request as a bearer credential, refreshes
//! it transparently (once per request) when the server reports it expired
//! or malformed, and purges stored credentials on unrecoverable failure.
//! The resource services ([`services`]) are typed pass-through wrappers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use docket_client::{ApiConfig, DocketClient};
//! use docket_client::auth::FileCredentialStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = FileCredentialStore::open("docket.credentials.json").await?;
//! let client = DocketClient::new(ApiConfig::from_env(), Arc::new(store));
//!
//! let user = client.auth().login("advocate@example.com", "secret").await?;
//! let cases = client.cases().list().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod services;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use auth::{SessionClient, SessionEvent, SessionState, User};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

use auth::CredentialStore;
use http::{HttpTransport, ReqwestTransport};
use services::{AuthApi, CalendarApi, CaseApi, ClientApi, DocumentApi, HearingUpdateApi};

/// Entry point bundling the session client with one service handle per
/// backend resource.
pub struct DocketClient {
    session: Arc<SessionClient>,
}

impl DocketClient {
    /// Build a client with the default reqwest transport.
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()), store)
    }

    /// Build a client over a custom transport.
    pub fn with_transport(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            session: Arc::new(SessionClient::new(config, transport, store)),
        }
    }

    /// The shared session client.
    pub fn session(&self) -> &Arc<SessionClient> {
        &self.session
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(Arc::clone(&self.session))
    }

    pub fn cases(&self) -> CaseApi {
        CaseApi::new(Arc::clone(&self.session))
    }

    pub fn clients(&self) -> ClientApi {
        ClientApi::new(Arc::clone(&self.session))
    }

    pub fn hearing_updates(&self) -> HearingUpdateApi {
        HearingUpdateApi::new(Arc::clone(&self.session))
    }

    pub fn calendar(&self) -> CalendarApi {
        CalendarApi::new(Arc::clone(&self.session))
    }

    pub fn documents(&self) -> DocumentApi {
        DocumentApi::new(Arc::clone(&self.session))
    }
}
