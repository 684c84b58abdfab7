// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unverified claim decoding for expiry bookkeeping.
//!
//! The signature is never checked; the backend is the only party that
//! validates tokens. We only need to know when the access token expires.

use crate::error::ClientError;
use crate::time_utils::format_unix_rfc3339;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Claims read from an access token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// `sub`, falling back to `id`
    pub subject: Option<String>,
    /// `iat` (Unix seconds)
    pub issued_at: Option<i64>,
    /// `exp` (Unix seconds)
    pub expires_at: i64,
    pub role: Option<String>,
}

impl Claims {
    /// Seconds left until expiry (negative once expired).
    pub fn seconds_remaining(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }

    /// True when the token expires in less than `threshold`.
    ///
    /// A token with exactly `threshold` left is still usable.
    pub fn needs_refresh(&self, now: i64, threshold: Duration) -> bool {
        let threshold = i64::try_from(threshold.as_secs()).unwrap_or(i64::MAX);
        self.seconds_remaining(now) < threshold
    }
}

impl fmt::Display for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sub={} exp={}",
            self.subject.as_deref().unwrap_or("<none>"),
            format_unix_rfc3339(self.expires_at)
        )
    }
}

/// Decode the payload segment of a three-part token.
pub fn decode(token: &str) -> Result<Claims, ClientError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClientError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::MalformedToken(format!("payload is not base64url: {e}")))?;

    let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::MalformedToken(format!("payload is not JSON: {e}")))?;
    let Value::Object(claims) = payload else {
        return Err(ClientError::MalformedToken(
            "payload is not a JSON object".to_string(),
        ));
    };

    let expires_at = claims
        .get("exp")
        .and_then(numeric_date)
        .ok_or_else(|| ClientError::MalformedToken("missing or invalid exp claim".to_string()))?;

    Ok(Claims {
        subject: claims
            .get("sub")
            .or_else(|| claims.get("id"))
            .and_then(string_like),
        issued_at: claims.get("iat").and_then(numeric_date),
        expires_at,
        role: claims.get("role").and_then(string_like),
    })
}

/// NumericDate may be an integer or a float.
fn numeric_date(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_like(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
