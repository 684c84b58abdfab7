// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, logout and session bootstrap.
//!
//! Handles:
//! - One-time session restore from stored tokens
//! - Credential login and identity fetch
//! - Best-effort logout
//! - Route-guard checks

use crate::error::ClientError;
use crate::middleware::AuthPipeline;
use crate::models::{LoginCredentials, UserIdentity};
use crate::services::backend::BackendClient;
use crate::services::coordinator::RefreshCoordinator;
use crate::services::session::{Session, SessionState};
use std::sync::Arc;
use tokio::sync::OnceCell;
use validator::Validate;

const NO_QUERY: &[(&str, &str)] = &[];

/// Session lifecycle operations exposed to the host.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    coordinator: RefreshCoordinator,
    pipeline: AuthPipeline,
    session: SessionState,
    initialized: Arc<OnceCell<()>>,
}

impl AuthService {
    pub fn new(
        backend: BackendClient,
        coordinator: RefreshCoordinator,
        pipeline: AuthPipeline,
        session: SessionState,
    ) -> Self {
        Self {
            backend,
            coordinator,
            pipeline,
            session,
            initialized: Arc::new(OnceCell::new()),
        }
    }

    /// Restore the session from stored tokens.
    ///
    /// Runs once per process; later and concurrent calls wait for the first
    /// run and return the resulting session.
    pub async fn initialize(&self) -> Session {
        self.initialized
            .get_or_init(|| async {
                if !self.coordinator.has_tokens() {
                    tracing::info!("No stored tokens, starting unauthenticated");
                    self.session.reset(None);
                    return;
                }

                self.session.begin_loading();
                match self.fetch_current_user().await {
                    Ok(user) => tracing::info!(user_id = user.id, "Session restored"),
                    Err(e) => tracing::info!(error = %e, "Could not restore session"),
                }
            })
            .await;

        self.session.current()
    }

    /// Exchange credentials for tokens and load the identity.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserIdentity, ClientError> {
        if let Err(e) = credentials.validate() {
            let err = ClientError::BadRequest(format!("Invalid credentials: {e}"));
            self.session.reset(Some(err.clone()));
            return Err(err);
        }

        self.session.begin_loading();
        let pair = match self.backend.login(credentials).await {
            Ok(pair) => pair,
            Err(e) => {
                self.session.reset(Some(e.clone()));
                return Err(e);
            }
        };

        self.coordinator.install(pair).await;
        tracing::info!(username = %credentials.username, "Login succeeded");

        self.fetch_current_user().await
    }

    /// Sign out locally, telling the backend when possible.
    ///
    /// Never fails; the host navigates to the login page itself.
    pub async fn logout(&self) {
        if let Some(pair) = self.coordinator.current_pair() {
            if let Err(e) = self.backend.logout(&pair).await {
                tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }

        self.coordinator.invalidate().await;
        self.session.reset(None);
        tracing::info!("Logged out");
    }

    /// Verify the session against the backend.
    pub async fn check_auth_status(&self) -> bool {
        if !self.coordinator.has_tokens() {
            self.session.reset(None);
            return false;
        }
        self.fetch_current_user().await.is_ok()
    }

    /// Route guard: redirect to login unless authenticated.
    ///
    /// A check that already ended the session has redirected; the guard
    /// does not redirect a second time.
    pub async fn require_auth(&self) -> bool {
        if self.session.is_authenticated() || self.check_auth_status().await {
            return true;
        }
        self.session.end(ClientError::NotAuthenticated);
        false
    }

    /// `GET /users/me`, updating the session with the result.
    ///
    /// Session-ending failures have already signed the session out by the
    /// time they return; anything else is recorded and leaves tokens alone.
    pub async fn fetch_current_user(&self) -> Result<UserIdentity, ClientError> {
        match self
            .pipeline
            .get_json::<UserIdentity, _>("users/me", NO_QUERY)
            .await
        {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(e) if e.ends_session() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch current user");
                self.session.set_error(e.clone());
                Err(e)
            }
        }
    }
}
