// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access/refresh token pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access and refresh tokens, always held together.
///
/// Tokens are stored bare (no `Bearer ` prefix, no quotes).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Build a pair from possibly-missing halves; a partial pair is no pair.
    pub fn from_parts(access_token: Option<String>, refresh_token: Option<String>) -> Option<Self> {
        let access_token = access_token.and_then(|t| normalize_token(&t))?;
        let refresh_token = refresh_token.and_then(|t| normalize_token(&t))?;
        Some(Self {
            access_token,
            refresh_token,
        })
    }

    /// True when both halves are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Normalize a token as received in a response header.
///
/// Trims whitespace, strips surrounding double quotes and a case-insensitive
/// `Bearer ` prefix. Returns `None` when nothing is left.
pub fn normalize_token(raw: &str) -> Option<String> {
    let mut token = raw.trim();
    token = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
        .trim();

    if token
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "))
    {
        token = token[7..].trim();
    }

    let token = token.trim_matches('"');
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
