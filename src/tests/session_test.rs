//! Unit tests for the session client's token lifecycle: bearer attachment,
//! refresh-and-replay, and credential purge semantics.

use std::sync::Arc;

use crate::auth::{
    CredentialPair, CredentialStore, MemoryCredentialStore, SessionClient, SessionEvent,
};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::mock::MockTransport;
use crate::http::RequestDescriptor;

const BASE: &str = "http://api.test";

fn cases_url() -> String {
    format!("{}/cases", BASE)
}

fn refresh_url() -> String {
    format!("{}/auth/refresh", BASE)
}

fn session(transport: &Arc<MockTransport>, store: &Arc<MemoryCredentialStore>) -> SessionClient {
    SessionClient::new(
        ApiConfig::new(BASE),
        Arc::clone(transport) as Arc<dyn crate::http::HttpTransport>,
        Arc::clone(store) as Arc<dyn CredentialStore>,
    )
}

async fn seed(store: &MemoryCredentialStore, access: &str, refresh: &str) {
    store
        .store_pair(&CredentialPair::new(access, refresh))
        .await
        .unwrap();
}

#[tokio::test]
async fn no_stored_token_dispatches_without_authorization() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    transport.enqueue(cases_url(), 200, "[]");

    let session = session(&transport, &store);
    let response = session.send(RequestDescriptor::get("/cases")).await.unwrap();

    assert_eq!(response.status(), 200);
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].authorization.is_none());
}

#[tokio::test]
async fn blank_stored_token_fails_before_any_network_call() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "   ", "refresh").await;

    let session = session(&transport, &store);
    let mut events = session.subscribe();
    let result = session.send(RequestDescriptor::get("/cases")).await;

    assert!(matches!(result, Err(ApiError::InvalidCredential)));
    assert!(transport.calls().is_empty());
    assert_eq!(store.access_token().await.unwrap(), None);
    assert_eq!(store.refresh_token().await.unwrap(), None);

    let event = events.recv().await.unwrap();
    assert!(matches!(
        event,
        SessionEvent::CredentialsInvalidated { .. }
    ));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed_once() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "stale", "refresh").await;

    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);
    transport.enqueue(cases_url(), 200, r#"[{"id": 1}]"#);
    transport.enqueue(refresh_url(), 200, r#"{"access_token": "fresh"}"#);

    let session = session(&transport, &store);
    let response = session.send(RequestDescriptor::get("/cases")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), r#"[{"id": 1}]"#);

    let cases_calls = transport.calls_to(&cases_url());
    assert_eq!(cases_calls.len(), 2);
    assert_eq!(cases_calls[0].authorization.as_deref(), Some("Bearer stale"));
    assert_eq!(cases_calls[1].authorization.as_deref(), Some("Bearer fresh"));

    let refresh_calls = transport.calls_to(&refresh_url());
    assert_eq!(refresh_calls.len(), 1);
    assert_eq!(
        refresh_calls[0].authorization.as_deref(),
        Some("Bearer refresh")
    );

    // The new access token is stored; the refresh token is untouched.
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("fresh"));
    assert_eq!(
        store.refresh_token().await.unwrap().as_deref(),
        Some("refresh")
    );
}

#[tokio::test]
async fn rejected_token_422_takes_the_same_refresh_path() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "mangled", "refresh").await;

    transport.enqueue(cases_url(), 422, r#"{"msg": "Not enough segments"}"#);
    transport.enqueue(cases_url(), 200, "[]");
    transport.enqueue(refresh_url(), 200, r#"{"access_token": "fresh"}"#);

    let session = session(&transport, &store);
    let response = session.send(RequestDescriptor::get("/cases")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(transport.calls_to(&refresh_url()).len(), 1);
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn refresh_failure_purges_credentials_and_replaces_the_error() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "stale", "dead-refresh").await;

    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);
    transport.enqueue(refresh_url(), 401, r#"{"error": "invalid refresh token"}"#);

    let session = session(&transport, &store);
    let mut events = session.subscribe();
    let result = session.send(RequestDescriptor::get("/cases")).await;

    match result {
        Err(ApiError::RefreshFailed { message }) => {
            assert_eq!(message, "invalid refresh token");
        }
        other => panic!("expected RefreshFailed, got {:?}", other.map(|r| r.status())),
    }

    assert_eq!(store.access_token().await.unwrap(), None);
    assert_eq!(store.refresh_token().await.unwrap(), None);

    let event = events.recv().await.unwrap();
    assert!(matches!(
        event,
        SessionEvent::CredentialsInvalidated { .. }
    ));
}

#[tokio::test]
async fn missing_refresh_token_purges_and_surfaces_the_original_error() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    // Access token only; no refresh token stored.
    store.store_access_token("stale").await.unwrap();

    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);

    let session = session(&transport, &store);
    let result = session.send(RequestDescriptor::get("/cases")).await;

    assert!(matches!(result, Err(ApiError::AuthExpired { .. })));
    assert!(transport.calls_to(&refresh_url()).is_empty());
    assert_eq!(store.access_token().await.unwrap(), None);
}

#[tokio::test]
async fn already_retried_request_is_never_refreshed_again() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "token", "refresh").await;

    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);

    let session = session(&transport, &store);
    let mut request = RequestDescriptor::get("/cases");
    request.retried = true;
    let result = session.send(request).await;

    assert!(matches!(result, Err(ApiError::AuthExpired { .. })));
    assert!(transport.calls_to(&refresh_url()).is_empty());
    // No purge on a plain propagated auth error.
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("token"));
}

#[tokio::test]
async fn second_auth_failure_after_replay_is_surfaced_as_is() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "stale", "refresh").await;

    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);
    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);
    transport.enqueue(refresh_url(), 200, r#"{"access_token": "fresh"}"#);

    let session = session(&transport, &store);
    let result = session.send(RequestDescriptor::get("/cases")).await;

    assert!(matches!(result, Err(ApiError::AuthExpired { .. })));
    assert_eq!(transport.calls_to(&cases_url()).len(), 2);
    assert_eq!(transport.calls_to(&refresh_url()).len(), 1);
}

#[tokio::test]
async fn non_auth_error_propagates_without_credential_mutation() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "token", "refresh").await;

    transport.enqueue(cases_url(), 404, r#"{"error": "Case not found"}"#);

    let session = session(&transport, &store);
    let result = session.send(RequestDescriptor::get("/cases")).await;

    match result {
        Err(ApiError::RequestFailed { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Case not found");
        }
        other => panic!("expected RequestFailed, got {:?}", other.map(|r| r.status())),
    }
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("token"));
    assert_eq!(
        store.refresh_token().await.unwrap().as_deref(),
        Some("refresh")
    );
}

#[tokio::test]
async fn concurrent_auth_failures_share_a_single_refresh() {
    // Latency makes both requests hit the wire before either sees its 401,
    // reproducing the concurrent-expiry race.
    let transport = Arc::new(MockTransport::with_latency(
        std::time::Duration::from_millis(10),
    ));
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "stale", "refresh").await;

    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);
    transport.enqueue(cases_url(), 401, r#"{"msg": "Token has expired"}"#);
    transport.enqueue(cases_url(), 200, "[]");
    transport.enqueue(cases_url(), 200, "[]");
    transport.enqueue(refresh_url(), 200, r#"{"access_token": "fresh"}"#);

    let session = Arc::new(session(&transport, &store));
    let (first, second) = tokio::join!(
        session.send(RequestDescriptor::get("/cases")),
        session.send(RequestDescriptor::get("/cases")),
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    // Exactly one refresh reached the network; the other request reused
    // the token it produced.
    assert_eq!(transport.calls_to(&refresh_url()).len(), 1);
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn logout_removes_credentials_and_returns_to_anonymous() {
    use crate::auth::SessionState;

    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, "token", "refresh").await;

    let session = session(&transport, &store);
    session.logout().await.unwrap();

    assert_eq!(store.access_token().await.unwrap(), None);
    assert_eq!(store.refresh_token().await.unwrap(), None);
    assert_eq!(session.state().await, SessionState::Anonymous);
}
