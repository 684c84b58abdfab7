// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types shared by the auth core and the resource clients.

/// Errors surfaced by the CMS client.
///
/// `Clone` because a single refresh outcome is delivered to every queued
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Stable machine-readable code for UI layers.
    pub fn code(&self) -> &str {
        match self {
            ClientError::NotAuthenticated => "NOT_AUTHENTICATED",
            ClientError::MalformedToken(_) => "MALFORMED_TOKEN",
            ClientError::RefreshFailed(_) => "REFRESH_FAILED",
            ClientError::Unauthorized => "UNAUTHORIZED",
            ClientError::LoginRejected(_) => "LOGIN_REJECTED",
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Server { code: Some(code), .. } => code,
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
            ClientError::BadRequest(_) => "BAD_REQUEST",
            ClientError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether this error means the user has to log in again.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated
                | ClientError::MalformedToken(_)
                | ClientError::RefreshFailed(_)
                | ClientError::Unauthorized
        )
    }

    /// HTTP status of the failing response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::InvalidResponse(err.to_string());
        }
        if let Some(status) = err.status() {
            return ClientError::Server {
                status: status.as_u16(),
                code: None,
                message: err.to_string(),
            };
        }
        ClientError::Network(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
