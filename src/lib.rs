// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! cms-client: authenticated client for the CMS admin API
//!
//! This crate keeps a JWT access/refresh token pair alive on behalf of an
//! admin front end: it refreshes tokens before they expire, retries once on
//! rejection, and publishes the session state for route guards and UI.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod resources;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use error::ClientError;
use middleware::AuthPipeline;
use resources::{PageLimits, Resources};
use services::{
    AuthService, BackendClient, LogRedirect, LoginRedirect, RefreshCoordinator, SessionState,
};
use std::sync::Arc;
use store::TokenStore;

/// Shared client state. Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct CmsClient {
    pub config: Config,
    pub session: SessionState,
    pub coordinator: RefreshCoordinator,
    pub pipeline: AuthPipeline,
    pub auth: AuthService,
    pub resources: Resources,
}

impl CmsClient {
    /// Wire up the client with an explicit store and redirect hook.
    pub fn new(
        config: Config,
        store: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ClientError> {
        let backend = BackendClient::new(&config)?;
        let session = SessionState::new(redirect);
        let coordinator = RefreshCoordinator::new(
            backend.clone(),
            store,
            session.clone(),
            config.refresh_threshold,
        );
        let pipeline = AuthPipeline::new(
            backend.clone(),
            coordinator.clone(),
            session.clone(),
            config.debug_http,
        );
        let auth = AuthService::new(
            backend,
            coordinator.clone(),
            pipeline.clone(),
            session.clone(),
        );
        let resources = Resources::new(
            pipeline.clone(),
            PageLimits {
                default_size: config.default_page_size,
                max_size: config.max_page_size,
            },
        );

        Ok(Self {
            config,
            session,
            coordinator,
            pipeline,
            auth,
            resources,
        })
    }

    /// Store and redirect chosen from configuration.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let store = store::from_config(&config)?;
        let redirect = Arc::new(LogRedirect {
            login_path: config.login_path.clone(),
        });
        Self::new(config, store, redirect)
    }
}
