#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;

use shiksha::config::{ApiConfig, ConfigV1, FileStoreConfig, StoreConfig};
use shiksha::session::now_millis;
use shiksha::startup;
use shiksha::state::AppState;

#[derive(Debug, Serialize)]
struct TestClaims {
    exp: i64,
    iat: i64,
    token_type: &'static str,
    user_id: i64,
}

pub fn config_for(base_url: &str, storage: StoreConfig) -> ConfigV1 {
    ConfigV1 {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: Some(5),
        },
        storage,
        ..Default::default()
    }
}

pub fn memory_app(base_url: &str) -> AppState {
    build_app(config_for(base_url, StoreConfig::Memory))
}

pub fn file_app(base_url: &str, path: &Path) -> AppState {
    build_app(config_for(
        base_url,
        StoreConfig::File(FileStoreConfig {
            path: path.to_path_buf(),
        }),
    ))
}

pub fn build_app(config: ConfigV1) -> AppState {
    startup::build(Arc::new(config)).expect("app should build")
}

/// An HS256 access token expiring `expires_in_secs` from now (negative for
/// already expired). The client never checks the signature.
pub fn access_token(expires_in_secs: i64) -> String {
    let now = now_millis() / 1000;
    let claims = TestClaims {
        exp: now + expires_in_secs,
        iat: now,
        token_type: "access",
        user_id: 1,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .expect("failed to encode token")
}

pub fn session_body(access: &str, refresh: &str, email: &str) -> String {
    json!({
        "access": access,
        "refresh": refresh,
        "user": {"id": 1, "email": email, "username": email.split('@').next().unwrap_or(email)}
    })
    .to_string()
}

pub fn profile_body(email: &str, first_name: &str, last_name: &str) -> String {
    json!({
        "id": 1,
        "email": email,
        "username": email.split('@').next().unwrap_or(email),
        "first_name": first_name,
        "last_name": last_name
    })
    .to_string()
}
