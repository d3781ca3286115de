mod common;

use common::{api_settings, expired_token, mount_login, valid_token};
use mall_console::config::{LogSettings, Settings, StorageSettings};
use mall_console::models::auth::LoginRequest;
use mall_console::startup::build_state;
use serde_json::json;
use std::path::Path;
use wiremock::MockServer;

fn settings(server: &MockServer, storage: &Path) -> Settings {
    Settings {
        api: api_settings(server),
        storage: StorageSettings {
            path: storage.to_path_buf(),
        },
        log: LogSettings::default(),
    }
}

fn write_session(path: &Path, token: &str, user: &str) {
    let contents = json!({ "access_token": token, "current_user": user });
    std::fs::write(path, contents.to_string()).unwrap();
}

fn stored_keys(path: &Path) -> serde_json::Map<String, serde_json::Value> {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    mount_login(&server, "u-5", "ADMIN").await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("nested").join("session.json");

    let first = build_state(&settings(&server, &storage)).unwrap();
    first
        .auth
        .login(&LoginRequest {
            email: "admin@mall.test".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap();
    drop(first);

    let second = build_state(&settings(&server, &storage)).unwrap();
    assert!(second.session.is_authenticated());
    assert_eq!(second.session.current_user().unwrap().id, "u-5");
    assert_eq!(second.router.navigate("/").unwrap().url, "/admin/dashboard");
}

#[tokio::test]
async fn test_expired_token_is_cleared_at_startup() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("session.json");
    write_session(
        &storage,
        &expired_token("u-1", "USER"),
        r#"{"id":"u-1","email":"buyer@mall.test","role":"USER"}"#,
    );

    let state = build_state(&settings(&server, &storage)).unwrap();

    assert!(!state.session.is_authenticated());
    assert!(!state.session.has_token());
    assert!(stored_keys(&storage).is_empty());
    assert_eq!(
        state.router.navigate("/user/orders").unwrap().url,
        "/authentication/login?returnUrl=%2Fuser%2Forders"
    );
}

#[tokio::test]
async fn test_malformed_cached_user_degrades_to_no_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("session.json");
    write_session(&storage, &valid_token("u-1", "USER"), "{not json");

    let state = build_state(&settings(&server, &storage)).unwrap();

    assert!(!state.session.is_authenticated());
    assert!(!state.session.has_token());
}

#[tokio::test]
async fn test_corrupt_storage_file_starts_empty() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("session.json");
    std::fs::write(&storage, "definitely not json").unwrap();

    let state = build_state(&settings(&server, &storage)).unwrap();

    assert!(!state.session.is_authenticated());
    assert_eq!(
        state.router.navigate("/authentication/login").unwrap().url,
        "/authentication/login"
    );
}
