// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Observable session state.
//!
//! Route guards and UI layers subscribe; only the refresh coordinator, the
//! request pipeline and the auth service change it.

use crate::error::ClientError;
use crate::models::UserIdentity;
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<UserIdentity>,
    pub loading: bool,
    pub error: Option<ClientError>,
}

impl Session {
    /// Process-start value: nothing has been checked yet.
    pub fn unknown() -> Self {
        Self {
            authenticated: false,
            user: None,
            loading: true,
            error: None,
        }
    }

    /// Signed out by an authentication failure.
    fn has_ended(&self) -> bool {
        !self.authenticated
            && !self.loading
            && self.error.as_ref().is_some_and(ClientError::ends_session)
    }

    fn signed_out(error: Option<ClientError>) -> Self {
        Self {
            authenticated: false,
            user: None,
            loading: false,
            error,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Host hook that sends the user to the login entry point.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, reason: &ClientError);
}

/// Redirect collaborator that only logs; for headless hosts and tests.
#[derive(Debug, Clone)]
pub struct LogRedirect {
    pub login_path: String,
}

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, reason: &ClientError) {
        tracing::info!(login_path = %self.login_path, reason = %reason, "Session ended, login required");
    }
}

/// Process-wide session holder.
#[derive(Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Session>>,
    redirect: Arc<dyn LoginRedirect>,
}

impl SessionState {
    pub fn new(redirect: Arc<dyn LoginRedirect>) -> Self {
        let (tx, _rx) = watch::channel(Session::unknown());
        Self {
            tx: Arc::new(tx),
            redirect,
        }
    }

    /// Current session value.
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().authenticated
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Run `listener` for every session change until the state is dropped.
    pub fn on_change<F>(&self, listener: F) -> tokio::task::JoinHandle<()>
    where
        F: Fn(&Session) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                listener(&session);
            }
        })
    }

    /// Mark an operation in progress, clearing any stale error.
    pub(crate) fn begin_loading(&self) {
        self.tx.send_if_modified(|s| {
            let changed = !s.loading || s.error.is_some();
            s.loading = true;
            s.error = None;
            changed
        });
    }

    /// Authenticated with a freshly fetched identity (replaced wholesale).
    pub(crate) fn set_user(&self, user: UserIdentity) {
        tracing::debug!(user_id = user.id, "Session authenticated");
        self.tx.send_replace(Session {
            authenticated: true,
            user: Some(user),
            loading: false,
            error: None,
        });
    }

    /// A refresh succeeded; keep the known identity.
    pub(crate) fn token_refreshed(&self) {
        self.tx.send_if_modified(|s| {
            let changed = !s.authenticated || s.error.is_some();
            s.authenticated = true;
            s.error = None;
            changed
        });
    }

    /// Record a non-fatal error without touching authentication.
    pub(crate) fn set_error(&self, error: ClientError) {
        self.tx.send_modify(|s| {
            s.loading = false;
            s.error = Some(error);
        });
    }

    /// Signed out without a redirect (logout, no stored tokens, failed login).
    pub(crate) fn reset(&self, error: Option<ClientError>) {
        self.tx.send_if_modified(|s| {
            let next = Session::signed_out(error);
            if *s == next {
                return false;
            }
            *s = next;
            true
        });
    }

    /// Authentication ended involuntarily.
    ///
    /// Idempotent: the first call after the session was live (or never
    /// checked) publishes one change and notifies the redirect collaborator.
    /// Later calls keep the first cause and do nothing. Returns whether this
    /// call ended the session.
    pub(crate) fn end(&self, reason: ClientError) -> bool {
        let ended = self.tx.send_if_modified(|s| {
            if s.has_ended() {
                return false;
            }
            *s = Session::signed_out(Some(reason.clone()));
            true
        });

        if ended {
            tracing::warn!(reason = %reason, "Session ended");
            self.redirect.redirect_to_login(&reason);
        }
        ended
    }
}
