// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Debug logging of outgoing requests.

use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, Url};
use std::time::Instant;

const REDACTED: &str = "<redacted>";

/// Headers whose values never reach the log.
fn is_sensitive(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "authorization"
        || name == "cookie"
        || name == "set-cookie"
        || name.contains("token")
}

/// Render headers for logging with credentials masked.
pub fn redact_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive(name.as_str()) {
                REDACTED
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{}: {}", name.as_str(), value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One request in flight, started when debug logging is on.
pub struct RequestLog {
    method: Method,
    url: Url,
    started: Instant,
}

impl RequestLog {
    pub fn start(request: &Request) -> Self {
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            headers = %redact_headers(request.headers()),
            "HTTP request"
        );
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            started: Instant::now(),
        }
    }

    pub fn finish(self, result: &Result<Response, reqwest::Error>) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match result {
            Ok(response) => tracing::debug!(
                method = %self.method,
                url = %self.url,
                status = response.status().as_u16(),
                elapsed_ms,
                "HTTP response"
            ),
            Err(e) => tracing::debug!(
                method = %self.method,
                url = %self.url,
                error = %e,
                elapsed_ms,
                "HTTP request failed"
            ),
        }
    }
}
