// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request pipeline.
//!
//! A decorator around a request-building closure: it asks the refresh
//! coordinator for a token, attaches `Authorization: Bearer`, and on a 401
//! refreshes once and retries once.

use crate::error::ClientError;
use crate::middleware::trace::RequestLog;
use crate::models::{ApiResponse, Page, PaginatedResponse};
use crate::services::backend::BackendClient;
use crate::services::coordinator::RefreshCoordinator;
use crate::services::session::SessionState;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Sends requests with a fresh bearer token attached.
#[derive(Clone)]
pub struct AuthPipeline {
    backend: BackendClient,
    coordinator: RefreshCoordinator,
    session: SessionState,
    debug: bool,
}

impl AuthPipeline {
    pub fn new(
        backend: BackendClient,
        coordinator: RefreshCoordinator,
        session: SessionState,
        debug: bool,
    ) -> Self {
        Self {
            backend,
            coordinator,
            session,
            debug,
        }
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        self.backend.url(path)
    }

    /// Send the request built by `build` with authentication.
    ///
    /// `build` may be called twice (original attempt and one retry).
    /// Non-401 responses are returned unchanged, whatever their status.
    pub async fn execute<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let token = match self.coordinator.ensure_fresh().await {
            Ok(token) => token,
            Err(e) => return Err(self.session_ended(e)),
        };

        let response = self.dispatch(&build, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!(url = %response.url(), "Request rejected with 401, refreshing once");
        let token = match self.coordinator.force_refresh(&token).await {
            Ok(token) => token,
            Err(e) => return Err(self.session_ended(e)),
        };

        let response = self.dispatch(&build, &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "Request rejected again after refresh");
            self.coordinator.invalidate().await;
            return Err(self.session_ended(ClientError::Unauthorized));
        }

        Ok(response)
    }

    /// GET `path` and unwrap the response envelope.
    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self.execute(|http| http.get(&url).query(query)).await?;
        read_envelope(response).await
    }

    /// GET a paginated list.
    pub async fn get_page<T, Q>(&self, path: &str, query: &Q) -> Result<Page<T>, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self.execute(|http| http.get(&url).query(query)).await?;
        let (status, response) = check_status(response).await?;
        let envelope: PaginatedResponse<T> = response.json().await?;
        envelope.into_page(status)
    }

    /// Send `body` (if any) with `method` and unwrap the response envelope.
    pub async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self
            .execute(|http| {
                let request = http.request(method.clone(), &url);
                match body {
                    Some(body) => request.json(body),
                    None => request,
                }
            })
            .await?;
        read_envelope(response).await
    }

    /// Like [`AuthPipeline::send_json`] for endpoints that return no data.
    pub async fn send_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self
            .execute(|http| {
                let request = http.request(method.clone(), &url);
                match body {
                    Some(body) => request.json(body),
                    None => request,
                }
            })
            .await?;
        let (status, response) = check_status(response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(());
        }
        let envelope: ApiResponse<serde_json::Value> = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        envelope.ensure_success(status)
    }

    async fn dispatch<F>(&self, build: &F, token: &str) -> Result<Response, ClientError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let request = build(self.backend.http())
            .bearer_auth(token)
            .build()
            .map_err(|e| ClientError::BadRequest(e.to_string()))?;

        let log = self.debug.then(|| RequestLog::start(&request));

        let result = self.backend.http().execute(request).await;
        if let Some(log) = log {
            log.finish(&result);
        }

        result.map_err(|e| ClientError::Network(e.to_string()))
    }

    /// Fire the global session-ended signal and return the caller's error.
    fn session_ended(&self, cause: ClientError) -> ClientError {
        tracing::debug!(cause = %cause, "Authentication failed for request");
        self.session.end(ClientError::Unauthorized);
        ClientError::Unauthorized
    }
}

/// Fail on non-success statuses, keeping the backend's message.
async fn check_status(response: Response) -> Result<(u16, Response), ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok((status.as_u16(), response));
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ApiResponse<serde_json::Value>>(&body) {
        Ok(envelope) => (
            envelope.code,
            envelope.message.unwrap_or_else(|| status.to_string()),
        ),
        Err(_) if body.is_empty() => (None, status.to_string()),
        Err(_) => (None, body),
    };

    Err(ClientError::Server {
        status: status.as_u16(),
        code,
        message,
    })
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let (status, response) = check_status(response).await?;
    let envelope: ApiResponse<T> = response.json().await?;
    envelope.into_data(status)
}
