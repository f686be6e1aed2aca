use serde::{Deserialize, Serialize};

/// Profile of the authenticated practitioner, as returned by `/auth/me`
/// and embedded in the login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub bar_council_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Application-wide authentication state held by the session client.
///
/// Transitions: Anonymous -> Authenticating -> Authenticated -> Anonymous.
/// Any credential purge returns the state to Anonymous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    /// No credential pair is live.
    Anonymous,

    /// A login exchange is in flight.
    Authenticating,

    /// A credential pair is live and the user profile is known.
    Authenticated { user: User },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Notifications emitted by the session client. Subscribers decide policy;
/// the HTTP layer never navigates or re-prompts on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The session state changed.
    StateChanged { state: SessionState },

    /// The stored credential pair was removed without the caller asking
    /// for it: a malformed stored token or an unrecoverable refresh
    /// failure. The application shell typically reacts by returning to
    /// its login view. An explicit logout emits only a state change.
    CredentialsInvalidated { reason: String },
}
