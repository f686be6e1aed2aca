//! Session and credential lifecycle: bearer-token attachment, one-shot
//! refresh-and-replay, durable credential storage, and session state
//! notifications.

mod session;
mod state;
mod store;

pub use session::SessionClient;
pub use state::{SessionEvent, SessionState, User};
pub use store::{
    CredentialPair, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
