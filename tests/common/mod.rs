// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use housekeeping_api::config::Config;
use housekeeping_api::db::{DocumentStore, FirestoreStore, MemoryStore};
use housekeeping_api::models::Identity;
use housekeeping_api::routes::create_router;
use housekeeping_api::services::{FirebaseTokenVerifier, IdentityError, IdentityVerifier};
use housekeeping_api::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const TEST_KID: &str = "test-kid";
pub const TEST_SECRET: &[u8] = b"housekeeping-test-signing-secret";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a store connected to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreStore {
    let mut config = Config::test_default();
    config.firebase_project_id = "demo-housekeeping".to_string();
    FirestoreStore::new(&config)
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims of a valid token for `test-project`.
#[allow(dead_code)]
pub fn valid_claims(uid: &str, email: &str, role: Option<&str>) -> Value {
    let now = now_secs();
    let mut claims = json!({
        "sub": uid,
        "aud": "test-project",
        "iss": "https://securetoken.google.com/test-project",
        "iat": now,
        "exp": now + 3600,
        "auth_time": now - 60,
        "email": email,
    });
    if let Some(role) = role {
        claims["role"] = Value::String(role.to_string());
    }
    claims
}

/// Sign arbitrary claims with the test key.
#[allow(dead_code)]
pub fn sign_claims(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(TEST_SECRET)).unwrap()
}

/// Mint a valid ID token for a caller.
#[allow(dead_code)]
pub fn mint_token(uid: &str, role: Option<&str>) -> String {
    sign_claims(&valid_claims(uid, &format!("{uid}@example.com"), role))
}

/// Verifier that accepts tokens from [`mint_token`].
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> FirebaseTokenVerifier {
    FirebaseTokenVerifier::new_with_static_key(
        config,
        TEST_KID,
        Algorithm::HS256,
        DecodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

/// Verifier that always fails the same way.
#[allow(dead_code)]
pub struct FailingVerifier(pub IdentityError);

#[async_trait]
impl IdentityVerifier for FailingVerifier {
    async fn verify(&self, _token: &str) -> Result<Identity, IdentityError> {
        Err(self.0.clone())
    }
}

/// Test app backed by a fresh in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let verifier = Arc::new(test_verifier(&config));
    let state = Arc::new(AppState::new(
        config,
        store.clone() as Arc<dyn DocumentStore>,
        verifier,
    ));
    (create_router(state.clone()), state, store)
}

#[allow(dead_code)]
pub fn create_test_app_with_verifier(verifier: Arc<dyn IdentityVerifier>) -> axum::Router {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(MemoryStore::new()),
        verifier,
    ));
    create_router(state)
}

/// Build a request, optionally authenticated and with a JSON body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
