// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end request pipeline scenarios against a mock backend.

mod common;

use cms_client::config::Config;
use cms_client::error::ClientError;
use cms_client::models::TokenPair;
use cms_client::store::{MemoryTokenStore, TokenStore};
use cms_client::CmsClient;
use common::{make_token, ok, test_client, token_response, user_json, CountingRedirect};
use futures_util::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn meta_json() -> serde_json::Value {
    json!({
        "posts_count": 3,
        "pages_count": 1,
        "categories_count": 2,
        "tags_count": 4,
        "comments_count": 9
    })
}

#[tokio::test]
async fn test_valid_token_sent_once_without_refresh() {
    let server = MockServer::start().await;
    let access = make_token("valid", 3600);

    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(header("Authorization", bearer(&access).as_str()))
        .respond_with(ok(meta_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(access, "r1")));
    let meta = t.client.resources.meta.get().await.unwrap();

    assert_eq!(meta.posts_count, 3);
    assert_eq!(meta.comments_count, 9);
}

#[tokio::test]
async fn test_expiring_token_refreshed_before_request() {
    let server = MockServer::start().await;
    let fresh = make_token("fresh", 3600);

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("Refresh-Token", "r1"))
        .respond_with(token_response(&fresh, Some("r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(header("Authorization", bearer(&fresh).as_str()))
        .respond_with(ok(meta_json()))
        .expect(1)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(make_token("old", 120), "r1")));
    t.client.resources.meta.get().await.unwrap();

    assert_eq!(t.store.get(), Some(TokenPair::new(fresh, "r2")));
}

#[tokio::test]
async fn test_rejected_token_refreshed_and_retried_once() {
    let server = MockServer::start().await;
    let revoked = make_token("revoked", 3600);
    let fresh = make_token("fresh", 3600);

    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(header("Authorization", bearer(&revoked).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(header("Authorization", bearer(&fresh).as_str()))
        .respond_with(ok(meta_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(token_response(&fresh, Some("r2")))
        .expect(1)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(revoked, "r1")));
    let meta = t.client.resources.meta.get().await.unwrap();

    assert_eq!(meta.tags_count, 4);
    assert_eq!(t.redirect.count(), 0);
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let server = MockServer::start().await;
    let revoked = make_token("revoked", 3600);
    let fresh = make_token("fresh", 3600);

    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(header("Authorization", bearer(&revoked).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(header("Authorization", bearer(&fresh).as_str()))
        .respond_with(ok(meta_json()))
        .expect(5)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(token_response(&fresh, Some("r2")).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(revoked, "r1")));
    let meta = t.client.resources.meta.clone();

    let results = join_all((0..5).map(|_| {
        let meta = meta.clone();
        async move { meta.get().await }
    }))
    .await;

    assert!(results.iter().all(Result::is_ok));
}

#[tokio::test]
async fn test_failed_refresh_ends_session_once() {
    let server = MockServer::start().await;
    let valid = make_token("valid", 3600);

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ok(user_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ok(meta_json()))
        .expect(0)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(valid, "r1")));
    assert!(t.client.auth.initialize().await.authenticated);

    // Access token expires while the session is live.
    t.store.set(&TokenPair::new(make_token("expired", -1), "r1"));

    let meta = t.client.resources.meta.clone();
    let results = join_all((0..3).map(|_| {
        let meta = meta.clone();
        async move { meta.get().await }
    }))
    .await;

    for result in results {
        assert_eq!(result, Err(ClientError::Unauthorized));
    }
    assert_eq!(t.store.get(), None);
    assert_eq!(t.redirect.count(), 1);

    let session = t.client.session.current();
    assert!(!session.authenticated);
    assert!(session.user.is_none());
}

#[tokio::test]
async fn test_second_rejection_invalidates_session() {
    let server = MockServer::start().await;
    let fresh = make_token("fresh", 3600);

    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(token_response(&fresh, Some("r2")))
        .expect(1)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(make_token("old", 3600), "r1")));

    assert_eq!(
        t.client.resources.meta.get().await,
        Err(ClientError::Unauthorized)
    );
    assert_eq!(t.store.get(), None);
    assert!(!t.client.session.is_authenticated());
}

#[tokio::test]
async fn test_without_tokens_requests_fail_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ok(meta_json()))
        .expect(0)
        .mount(&server)
        .await;

    let t = test_client(&server, None);

    assert_eq!(
        t.client.resources.meta.get().await,
        Err(ClientError::Unauthorized)
    );
    assert_eq!(t.redirect.count(), 1);

    // Already signed out; later failures stay quiet.
    assert_eq!(
        t.client.resources.meta.get().await,
        Err(ClientError::Unauthorized)
    );
    assert_eq!(t.redirect.count(), 1);
}

#[tokio::test]
async fn test_failed_refresh_publishes_one_sign_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ok(user_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(make_token("valid", 3600), "r1")));
    assert!(t.client.auth.initialize().await.authenticated);
    t.store.set(&TokenPair::new(make_token("expired", -1), "r1"));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let listener = t.client.session.on_change(move |session| {
        let _ = tx.send(session.clone());
    });

    assert_eq!(
        t.client.resources.meta.get().await,
        Err(ClientError::Unauthorized)
    );
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    listener.abort();

    let mut changes = Vec::new();
    while let Some(session) = rx.recv().await {
        changes.push(session);
    }

    assert_eq!(changes.len(), 1, "changes: {changes:?}");
    assert!(!changes[0].authenticated);
    assert!(matches!(changes[0].error, Some(ClientError::RefreshFailed(_))));
    assert_eq!(t.redirect.count(), 1);
}

#[tokio::test]
async fn test_server_error_keeps_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "data": null,
            "message": "database unavailable",
            "code": 5001
        })))
        .mount(&server)
        .await;

    let pair = TokenPair::new(make_token("valid", 3600), "r1");
    let t = test_client(&server, Some(pair.clone()));

    let err = t.client.resources.meta.get().await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Server {
            status: 500,
            code: Some("5001".to_string()),
            message: "database unavailable".to_string(),
        }
    );
    assert_eq!(err.code(), "5001");
    assert_eq!(t.store.get(), Some(pair));
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "message": "not allowed",
            "code": "FORBIDDEN"
        })))
        .mount(&server)
        .await;

    let t = test_client(&server, Some(TokenPair::new(make_token("valid", 3600), "r1")));

    match t.client.resources.meta.get().await {
        Err(ClientError::Server { status, code, message }) => {
            assert_eq!(status, 200);
            assert_eq!(code.as_deref(), Some("FORBIDDEN"));
            assert_eq!(message, "not allowed");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_network_error_propagates_and_keeps_tokens() {
    let pair = TokenPair::new(make_token("valid", 3600), "r1");
    let store = Arc::new(MemoryTokenStore::with_pair(pair.clone()));
    let redirect = Arc::new(CountingRedirect::default());
    let client = CmsClient::new(
        Config::test_default("http://127.0.0.1:1"),
        store.clone(),
        redirect.clone(),
    )
    .unwrap();

    let err = client.resources.meta.get().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(store.get(), Some(pair));
    assert_eq!(redirect.count(), 0);
}
