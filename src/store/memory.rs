// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory and no-op token stores.

use super::TokenStore;
use crate::models::TokenPair;
use std::sync::RwLock;

/// Token store that lives as long as the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a pair (tests, hosts that hand over tokens).
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            slot: RwLock::new(Some(pair)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<TokenPair> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().filter(|pair| pair.is_complete()).cloned()
    }

    fn set(&self, pair: &TokenPair) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(pair.clone());
    }

    fn clear(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Store for non-interactive contexts: never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTokenStore;

impl TokenStore for NullTokenStore {
    fn get(&self) -> Option<TokenPair> {
        None
    }

    fn set(&self, _pair: &TokenPair) {}

    fn clear(&self) {}
}
