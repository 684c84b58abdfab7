// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw client for the backend's token endpoints.
//!
//! Handles:
//! - Login (`POST /auth/login/{username}`)
//! - Token refresh (`POST /auth/refresh`)
//! - Logout (`POST /auth/logout`)
//! - Token extraction from response headers
//!
//! Nothing here attaches stored credentials; that is the pipeline's job.

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{ApiResponse, LoginCredentials, TokenPair};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;

/// Backend auth endpoint client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    refresh_header: HeaderName,
}

impl BackendClient {
    /// Create a new client from configuration.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ClientError::BadRequest(format!("failed building HTTP client: {e}")))?;

        let refresh_header = HeaderName::from_bytes(config.refresh_token_header.as_bytes())
            .map_err(|_| {
                ClientError::BadRequest(format!(
                    "invalid refresh token header name: {}",
                    config.refresh_token_header
                ))
            })?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            refresh_header,
        })
    }

    /// Shared HTTP connection pool.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, ClientError> {
        let url = self.url(&format!(
            "auth/login/{}",
            urlencoding::encode(&credentials.username)
        ));

        let response = self
            .http
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Login request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            tracing::warn!(status = %status, username = %credentials.username, "Login rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                    ClientError::LoginRejected(message)
                }
                _ => ClientError::Server {
                    status: status.as_u16(),
                    code: None,
                    message,
                },
            });
        }

        self.extract_tokens(response.headers(), None).ok_or_else(|| {
            ClientError::InvalidResponse("Missing authentication tokens in login response".into())
        })
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// When the response carries no new refresh token the old one is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let header_value = HeaderValue::from_str(refresh_token)
            .map_err(|_| ClientError::RefreshFailed("refresh token is not a valid header".into()))?;

        let response = self
            .http
            .post(self.url("auth/refresh"))
            .header(self.refresh_header.clone(), header_value)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Token refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ClientError::RefreshFailed(format!("HTTP {status}: {message}")));
        }

        self.extract_tokens(response.headers(), Some(refresh_token))
            .ok_or_else(|| ClientError::RefreshFailed("Missing tokens in refresh response".into()))
    }

    /// Best-effort server-side logout.
    pub async fn logout(&self, pair: &TokenPair) -> Result<(), ClientError> {
        let mut request = self
            .http
            .post(self.url("auth/logout"))
            .bearer_auth(&pair.access_token);
        if let Ok(value) = HeaderValue::from_str(&pair.refresh_token) {
            request = request.header(self.refresh_header.clone(), value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Logout request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                code: None,
                message: error_message(response).await,
            });
        }

        tracing::info!("Backend logout successful");
        Ok(())
    }

    /// Pull the token pair out of `Authorization` and the refresh header.
    fn extract_tokens(&self, headers: &HeaderMap, previous_refresh: Option<&str>) -> Option<TokenPair> {
        let header_str = |name: &HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let access = header_str(&AUTHORIZATION);
        let refresh = header_str(&self.refresh_header)
            .filter(|t| !t.trim().is_empty())
            .or_else(|| previous_refresh.map(str::to_string));

        TokenPair::from_parts(access, refresh)
    }
}

/// Best-effort human message from an error response.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str::<ApiResponse<Value>>(&body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        })
}
