// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use cms_client::config::Config;
use cms_client::error::ClientError;
use cms_client::models::TokenPair;
use cms_client::services::LoginRedirect;
use cms_client::store::{MemoryTokenStore, TokenStore};
use cms_client::CmsClient;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::{MockServer, ResponseTemplate};

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    iat: i64,
    exp: i64,
    role: String,
}

#[allow(dead_code)]
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Mint an HS256 access token expiring `exp_offset` seconds from now.
///
/// `tag` goes into `sub` so tokens minted in the same second differ.
#[allow(dead_code)]
pub fn make_token(tag: &str, exp_offset: i64) -> String {
    let now = now();
    let claims = TestClaims {
        sub: tag.to_string(),
        iat: now,
        exp: now + exp_offset,
        role: "admin".to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test_signing_key_32_bytes_long!!"),
    )
    .expect("Failed to create JWT")
}

/// Counts login redirects.
#[derive(Default)]
pub struct CountingRedirect(AtomicUsize);

#[allow(dead_code)]
impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self, _reason: &ClientError) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Client wired to a mock backend.
#[allow(dead_code)]
pub struct TestClient {
    pub client: CmsClient,
    pub store: Arc<MemoryTokenStore>,
    pub redirect: Arc<CountingRedirect>,
}

#[allow(dead_code)]
pub fn test_client(server: &MockServer, initial: Option<TokenPair>) -> TestClient {
    let store = Arc::new(match initial {
        Some(pair) => MemoryTokenStore::with_pair(pair),
        None => MemoryTokenStore::new(),
    });
    let redirect = Arc::new(CountingRedirect::default());
    let client = CmsClient::new(
        Config::test_default(server.uri()),
        store.clone() as Arc<dyn TokenStore>,
        redirect.clone(),
    )
    .expect("Failed to build client");

    TestClient {
        client,
        store,
        redirect,
    }
}

/// Response carrying a token pair the way the backend sends it.
#[allow(dead_code)]
pub fn token_response(access: &str, refresh: Option<&str>) -> ResponseTemplate {
    let mut template = ResponseTemplate::new(200)
        .insert_header("Authorization", format!("Bearer {access}").as_str())
        .set_body_json(json!({ "success": true, "data": null }));
    if let Some(refresh) = refresh {
        template = template.insert_header("Refresh-Token", refresh);
    }
    template
}

/// `{success: true, data}` envelope.
#[allow(dead_code)]
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

#[allow(dead_code)]
pub fn user_json() -> Value {
    json!({
        "id": 1,
        "name": "Ada",
        "mail": "ada@example.com",
        "role": "admin",
        "activated": true,
        "createdAt": 1700000000000i64,
        "updatedAt": 1700000000000i64
    })
}
