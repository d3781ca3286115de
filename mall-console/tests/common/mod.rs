//! Shared setup for mall-console integration tests.

#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use mall_console::config::ApiSettings;
use mall_console::session::TokenStore;
use mall_console::startup::build_state_with_store;
use mall_console::AppState;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Unsigned JWT carrying `claims`. The client never verifies signatures.
pub fn make_token(claims: Value) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.test-signature",
        general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

pub fn valid_token(id: &str, role: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    make_token(json!({ "sub": id, "role": role, "iat": exp - 7200, "exp": exp }))
}

pub fn expired_token(id: &str, role: &str) -> String {
    let exp = chrono::Utc::now().timestamp() - 60;
    make_token(json!({ "sub": id, "role": role, "exp": exp }))
}

pub fn api_settings(server: &MockServer) -> ApiSettings {
    ApiSettings {
        base_url: server.uri(),
        timeout_secs: 5,
    }
}

pub fn spawn_state(server: &MockServer) -> AppState {
    build_state_with_store(&api_settings(server), TokenStore::in_memory())
        .expect("Failed to build state")
}

/// Mounts a successful `POST /auth/login` for a user with `role`.
pub async fn mount_login(server: &MockServer, id: &str, role: &str) -> String {
    let token = valid_token(id, role);
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "token": token,
                "user": { "id": id, "role": role }
            }
        })))
        .mount(server)
        .await;
    token
}

pub fn paginated(items: Value, total_items: u64) -> Value {
    json!({
        "success": true,
        "data": items,
        "pagination": {
            "page": 1,
            "limit": 10,
            "totalItems": total_items,
            "totalPages": total_items.div_ceil(10).max(1)
        }
    })
}
