//! Shared constructors for tests.

use std::sync::Arc;

use crate::{AppState, Config, images::MemoryImageStore, store::MemoryIdentityStore};

/// 1x1 transparent PNG as an inline data URI
pub const TEST_PNG_PAYLOAD: &str =
    "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Config with a signing secret set and defaults everywhere else
pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-tokens".to_string()),
        ..Default::default()
    }
}

/// App state wired to the in-memory backends
pub fn create_test_state() -> AppState {
    AppState::builder()
        .store(Arc::new(MemoryIdentityStore::new()))
        .images(Arc::new(MemoryImageStore::new()))
        .config(create_test_config())
        .build()
}

/// Full application router as a test server, plus the state behind it so
/// tests can inspect the store directly
#[cfg(test)]
pub fn create_test_app() -> (axum_test::TestServer, AppState) {
    let state = create_test_state();
    let router = crate::build_router(&state).expect("failed to build test router");
    let server = axum_test::TestServer::new(router).expect("failed to create test server");
    (server, state)
}

/// Well-formed signup body for the given email
#[cfg(test)]
pub fn signup_request(email: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": "longenough1",
        "name": "Ann",
    })
}

/// Log in with the password used by [`signup_request`] and return the token
#[cfg(test)]
pub async fn login(server: &axum_test::TestServer, email: &str) -> String {
    let response = server
        .post("/login")
        .json(&serde_json::json!({"email": email, "password": "longenough1"}))
        .await;
    response.assert_status_ok();
    response.json::<serde_json::Value>()["token"].as_str().expect("token in login response").to_string()
}
