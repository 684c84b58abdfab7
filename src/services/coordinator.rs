// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Refresh coordinator: the single owner of the token lifecycle.
//!
//! Every caller that needs a bearer token goes through [`RefreshCoordinator::ensure_fresh`].
//! At most one backend refresh is in flight at a time; callers arriving while
//! it runs are queued and resolved together, in arrival order, with the same
//! outcome.
//!
//! The coordinator is also the only writer of the token store. Login and
//! logout hand their pairs over through [`RefreshCoordinator::install`] and
//! [`RefreshCoordinator::invalidate`].

use crate::error::ClientError;
use crate::models::TokenPair;
use crate::services::backend::BackendClient;
use crate::services::claims;
use crate::services::session::SessionState;
use crate::store::TokenStore;
use crate::time_utils::now_unix_secs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};

type Waiter = oneshot::Sender<Result<String, ClientError>>;

/// Coordinator state machine.
enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
    Failed(ClientError),
}

/// Snapshot of [`RefreshState`] for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    Idle,
    Refreshing { waiters: usize },
    Failed(ClientError),
}

struct Slot {
    state: RefreshState,
    /// Bumped by `install`/`invalidate`; a refresh started under an older
    /// generation must not write its outcome.
    generation: u64,
}

struct Inner {
    backend: BackendClient,
    store: Arc<dyn TokenStore>,
    session: SessionState,
    threshold: Duration,
    slot: Mutex<Slot>,
}

/// What to do with the stored pair.
enum Decision {
    Use(String),
    Refresh(&'static str),
}

/// Shared handle to the token lifecycle.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        backend: BackendClient,
        store: Arc<dyn TokenStore>,
        session: SessionState,
        threshold: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                store,
                session,
                threshold,
                slot: Mutex::new(Slot {
                    state: RefreshState::Idle,
                    generation: 0,
                }),
            }),
        }
    }

    /// Get an access token that is valid for at least the refresh threshold.
    ///
    /// Refreshes proactively when the stored token is about to expire.
    pub async fn ensure_fresh(&self) -> Result<String, ClientError> {
        self.acquire(None).await
    }

    /// Reactive path after the backend rejected `rejected` with a 401.
    ///
    /// Refreshes even if the token still looks valid, unless another caller
    /// already replaced it.
    pub async fn force_refresh(&self, rejected: &str) -> Result<String, ClientError> {
        self.acquire(Some(rejected)).await
    }

    /// Persist a pair obtained from login.
    ///
    /// Supersedes an in-flight refresh: its waiters receive the new token and
    /// its eventual outcome is discarded.
    pub async fn install(&self, pair: TokenPair) {
        let mut slot = self.inner.slot.lock().await;
        slot.generation += 1;
        self.inner.store.set(&pair);

        let waiters = take_waiters(&mut slot.state);
        slot.state = RefreshState::Idle;
        drop(slot);

        if !waiters.is_empty() {
            tracing::debug!(waiters = waiters.len(), "New login supersedes in-flight refresh");
        }
        resolve(waiters, Ok(pair.access_token));
    }

    /// Drop the stored pair (logout, or the backend rejected a fresh token).
    pub async fn invalidate(&self) {
        let mut slot = self.inner.slot.lock().await;
        slot.generation += 1;
        self.inner.store.clear();

        let waiters = take_waiters(&mut slot.state);
        slot.state = RefreshState::Idle;
        drop(slot);

        resolve(waiters, Err(ClientError::NotAuthenticated));
    }

    /// Whether a complete pair is stored.
    pub fn has_tokens(&self) -> bool {
        self.inner.store.get().is_some()
    }

    /// Stored pair, for logout.
    pub(crate) fn current_pair(&self) -> Option<TokenPair> {
        self.inner.store.get()
    }

    /// Current state, for diagnostics and tests.
    pub async fn status(&self) -> RefreshStatus {
        match &self.inner.slot.lock().await.state {
            RefreshState::Idle => RefreshStatus::Idle,
            RefreshState::Refreshing { waiters } => RefreshStatus::Refreshing {
                waiters: waiters.len(),
            },
            RefreshState::Failed(err) => RefreshStatus::Failed(err.clone()),
        }
    }

    async fn acquire(&self, rejected: Option<&str>) -> Result<String, ClientError> {
        let (tx, rx) = oneshot::channel();

        {
            let mut guard = self.inner.slot.lock().await;
            let slot = &mut *guard;

            match &mut slot.state {
                RefreshState::Refreshing { waiters } => {
                    waiters.push(tx);
                    tracing::debug!(position = waiters.len(), "Refresh in flight, waiting");
                }
                state => {
                    if let RefreshState::Failed(err) = state {
                        tracing::debug!(error = %err, "Previous refresh failed, re-evaluating");
                    }
                    *state = RefreshState::Idle;

                    let Some(pair) = self.inner.store.get() else {
                        return Err(ClientError::NotAuthenticated);
                    };

                    match self.decide(&pair, rejected) {
                        Decision::Use(token) => return Ok(token),
                        Decision::Refresh(reason) => {
                            tracing::info!(reason, "Refreshing access token");
                            *state = RefreshState::Refreshing { waiters: vec![tx] };
                            let generation = slot.generation;
                            tokio::spawn(self.clone().run_refresh(pair.refresh_token, generation));
                        }
                    }
                }
            }
        }

        rx.await.unwrap_or_else(|_| {
            Err(ClientError::RefreshFailed(
                "refresh ended without a result".to_string(),
            ))
        })
    }

    fn decide(&self, pair: &TokenPair, rejected: Option<&str>) -> Decision {
        if rejected == Some(pair.access_token.as_str()) {
            return Decision::Refresh("access token rejected by backend");
        }

        match claims::decode(&pair.access_token) {
            Ok(claims) if claims.needs_refresh(now_unix_secs(), self.inner.threshold) => {
                tracing::debug!(claims = %claims, "Access token expiring within threshold");
                Decision::Refresh("access token expiring")
            }
            Ok(_) => Decision::Use(pair.access_token.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Stored access token unreadable");
                Decision::Refresh("access token unreadable")
            }
        }
    }

    /// The one backend refresh call. Runs detached so abandoning the first
    /// caller does not strand the others.
    async fn run_refresh(self, refresh_token: String, generation: u64) {
        let outcome = self.inner.backend.refresh(&refresh_token).await;

        let mut slot = self.inner.slot.lock().await;
        if slot.generation != generation {
            tracing::debug!("Discarding refresh outcome superseded by login/logout");
            return;
        }

        let waiters = take_waiters(&mut slot.state);
        let result = match outcome {
            Ok(pair) => {
                self.inner.store.set(&pair);
                slot.state = RefreshState::Idle;
                self.inner.session.token_refreshed();
                tracing::info!(waiters = waiters.len(), "Token refreshed");
                Ok(pair.access_token)
            }
            Err(e) => {
                let err = match e {
                    ClientError::RefreshFailed(_) => e,
                    other => ClientError::RefreshFailed(other.to_string()),
                };
                tracing::warn!(error = %err, waiters = waiters.len(), "Token refresh failed");
                self.inner.store.clear();
                slot.state = RefreshState::Failed(err.clone());
                self.inner.session.end(err.clone());
                Err(err)
            }
        };
        drop(slot);

        resolve(waiters, result);
    }
}

fn take_waiters(state: &mut RefreshState) -> Vec<Waiter> {
    match std::mem::replace(state, RefreshState::Idle) {
        RefreshState::Refreshing { waiters } => waiters,
        other => {
            *state = other;
            Vec::new()
        }
    }
}

/// Resolve waiters in arrival order with one shared outcome.
fn resolve(waiters: Vec<Waiter>, result: Result<String, ClientError>) {
    for waiter in waiters {
        // Receiver gone means that caller was abandoned.
        let _ = waiter.send(result.clone());
    }
}
