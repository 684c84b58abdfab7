// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token persistence.
//!
//! The store holds exactly one [`TokenPair`] and performs no validation of
//! its contents. All writes come from the refresh coordinator.

pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::{MemoryTokenStore, NullTokenStore};

use crate::config::{Config, TokenStoreKind};
use crate::error::ClientError;
use crate::models::TokenPair;
use std::sync::Arc;

/// Durable key/value slot for the current token pair.
pub trait TokenStore: Send + Sync {
    /// Current pair; a partially written pair reads as `None`.
    fn get(&self) -> Option<TokenPair>;

    fn set(&self, pair: &TokenPair);

    fn clear(&self);
}

/// Select the store implementation for the host environment.
pub fn from_config(config: &Config) -> Result<Arc<dyn TokenStore>, ClientError> {
    let store: Arc<dyn TokenStore> = match &config.token_store {
        TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
        TokenStoreKind::Disabled => Arc::new(NullTokenStore),
        TokenStoreKind::File(path) => Arc::new(FileTokenStore::open(path)?),
    };
    Ok(store)
}
