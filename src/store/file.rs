// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON file token store that survives restarts.
//!
//! Writes go through an in-memory copy first, then to disk via a temp file
//! and rename. Disk failures are logged; the in-memory copy stays
//! authoritative for the rest of the process.

use super::TokenStore;
use crate::error::ClientError;
use crate::models::TokenPair;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// On-disk shape. Both fields optional so a half-written file reads as empty.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Token store backed by a JSON file.
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<TokenPair>>,
}

impl FileTokenStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and treated as empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!(
                    "cannot create token store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let cached = match load(&path) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable token store");
                None
            }
        };

        tracing::debug!(
            path = %path.display(),
            has_tokens = cached.is_some(),
            "Token store opened"
        );

        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, contents: &StoredTokens) {
        if let Err(e) = write_atomic(&self.path, contents) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<TokenPair> {
        let cached = self.cached.read().unwrap_or_else(|e| e.into_inner());
        cached.as_ref().filter(|pair| pair.is_complete()).cloned()
    }

    fn set(&self, pair: &TokenPair) {
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some(pair.clone());
        self.persist(&StoredTokens {
            access_token: Some(pair.access_token.clone()),
            refresh_token: Some(pair.refresh_token.clone()),
        });
    }

    fn clear(&self) {
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = None;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove token store");
            }
        }
    }
}

fn load(path: &Path) -> io::Result<Option<TokenPair>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let stored: StoredTokens = serde_json::from_slice(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    match (stored.access_token, stored.refresh_token) {
        (Some(access_token), Some(refresh_token)) => Ok(Some(TokenPair {
            access_token,
            refresh_token,
        })),
        _ => Ok(None),
    }
}

fn write_atomic(path: &Path, contents: &StoredTokens) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(contents)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, path)
}
