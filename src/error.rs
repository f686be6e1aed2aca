use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the docket API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A stored access token was present but malformed. Detected before any
    /// network call; both stored tokens have been purged.
    #[error("stored access token is malformed")]
    InvalidCredential,

    /// The server reported the access token as expired (HTTP 401).
    #[error("access token expired: {message}")]
    AuthExpired { message: String },

    /// The server rejected the access token as malformed (HTTP 422).
    #[error("access token rejected: {message}")]
    AuthRejected { message: String },

    /// The refresh call itself failed. Both stored tokens have been purged;
    /// this error replaces whatever error triggered the refresh.
    #[error("token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// Any other non-2xx response. No credential mutation occurs.
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// Connection-level failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(String),

    /// Credential store failure.
    #[error("credential store error: {0}")]
    Storage(String),

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Map a non-2xx response to its error variant. 401 and 422 get their
    /// own variants so the session layer can recognize refreshable failures.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body);
        match status {
            401 => Self::AuthExpired { message },
            422 => Self::AuthRejected { message },
            _ => Self::RequestFailed { status, message },
        }
    }

    /// Whether this error is a server-side token problem that a refresh
    /// may recover from.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthExpired { .. } | Self::AuthRejected { .. })
    }
}

/// Extract the server-provided error message from a response body, falling
/// back to a generic message. The backend reports failures as
/// `{"error": "..."}`; the JWT middleware uses `{"msg": "..."}`.
pub(crate) fn server_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "request failed".to_string())
}

/// Result type for all client operations.
pub type ApiResult<T> = Result<T, ApiError>;
