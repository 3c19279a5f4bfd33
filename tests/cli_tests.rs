use std::path::PathBuf;

use salam::api::auth::{CredentialStore, Credentials};
use salam::cli::{Command, execute};
use salam::core::config::{ResolvedConfig, SalamConfig, resolve_with};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn config_for(server: &MockServer) -> ResolvedConfig {
    resolve_with(&SalamConfig::default(), Some(&server.uri()), |_| None)
}

fn temp_store(name: &str) -> CredentialStore {
    let dir: PathBuf = std::env::temp_dir().join(format!("salam-cli-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let store = CredentialStore::new(dir.join("credentials.json"));
    store.clear().unwrap();
    store
}

fn user_json() -> serde_json::Value {
    json!({
        "google_id": "g-1",
        "name": "Yusuf Ali",
        "email": "yusuf@example.com"
    })
}

// ============================================================================
// login / whoami / logout
// ============================================================================

#[tokio::test]
async fn test_login_verifies_token_and_stores_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let store = temp_store("login");
    let callback = "http://localhost:3000/auth/callback?token=fresh-token".to_string();
    execute(Command::Login { callback: Some(callback) }, &config_for(&server), &store)
        .await
        .unwrap();

    let creds = store.load().unwrap().unwrap();
    assert_eq!(creds.token, "fresh-token");
    assert_eq!(creds.user.unwrap().email, "yusuf@example.com");
}

#[tokio::test]
async fn test_login_with_error_callback_stores_nothing() {
    let server = MockServer::start().await;
    let store = temp_store("login-denied");

    let callback = "http://localhost:3000/auth/callback?error=access_denied".to_string();
    let err = execute(Command::Login { callback: Some(callback) }, &config_for(&server), &store)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("denied"));
    assert!(store.load().unwrap().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_with_rejected_token_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = temp_store("login-401");
    let result = execute(
        Command::Login {
            callback: Some("?token=stale".to_string()),
        },
        &config_for(&server),
        &store,
    )
    .await;

    assert!(result.is_err());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_whoami_refreshes_mirrored_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let store = temp_store("whoami");
    store
        .save(&Credentials {
            token: "tok".to_string(),
            user: None,
        })
        .unwrap();

    execute(Command::Whoami, &config_for(&server), &store).await.unwrap();

    let creds = store.load().unwrap().unwrap();
    assert_eq!(creds.token, "tok");
    assert_eq!(creds.user.unwrap().name, "Yusuf Ali");
}

#[tokio::test]
async fn test_whoami_with_expired_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = temp_store("whoami-401");
    store
        .save(&Credentials {
            token: "expired".to_string(),
            user: None,
        })
        .unwrap();

    let err = execute(Command::Whoami, &config_for(&server), &store).await.unwrap_err();
    assert!(err.to_string().contains("salam login"));
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_logout_clears_credentials() {
    let server = MockServer::start().await;
    let store = temp_store("logout");
    store
        .save(&Credentials {
            token: "tok".to_string(),
            user: None,
        })
        .unwrap();

    execute(Command::Logout, &config_for(&server), &store).await.unwrap();
    assert!(store.load().unwrap().is_none());
    // Logging out twice is fine
    execute(Command::Logout, &config_for(&server), &store).await.unwrap();
}
