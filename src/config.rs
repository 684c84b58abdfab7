// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default header carrying the refresh token in both directions.
pub const REFRESH_TOKEN_HEADER: &str = "Refresh-Token";

/// Margin before token expiration when we proactively refresh (5 minutes).
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 5 * 60;

/// Where tokens are persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStoreKind {
    /// Process lifetime only.
    Memory,
    /// JSON file at the given path.
    File(PathBuf),
    /// Non-interactive context: nothing is stored.
    Disabled,
}

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API root, e.g. `http://localhost:8000/api/v1`
    pub api_base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Refresh when the access token expires sooner than this
    pub refresh_threshold: Duration,
    /// Header name used for the refresh token
    pub refresh_token_header: String,
    /// Token persistence backend
    pub token_store: TokenStoreKind,
    /// Log every request/response pair at debug level
    pub debug_http: bool,
    /// Login entry point handed to the redirect collaborator
    pub login_path: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".to_string(),
            request_timeout: Duration::from_secs(10),
            refresh_threshold: Duration::from_secs(DEFAULT_REFRESH_THRESHOLD_SECS),
            refresh_token_header: REFRESH_TOKEN_HEADER.to_string(),
            token_store: TokenStoreKind::Memory,
            debug_http: false,
            login_path: "/login".to_string(),
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// Default config for testing, pointed at a mock backend.
    pub fn test_default(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout: Duration::from_secs(5),
            debug_http: true,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset ones fall back to [`Config::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let token_store = match env::var("CMS_TOKEN_STORE") {
            Ok(v) => parse_token_store(&v),
            Err(_) => defaults.token_store,
        };

        Ok(Self {
            api_base_url: env::var("CMS_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            request_timeout: env_secs("CMS_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            refresh_threshold: env_secs("CMS_REFRESH_THRESHOLD_SECS")?
                .unwrap_or(defaults.refresh_threshold),
            refresh_token_header: env::var("CMS_REFRESH_TOKEN_HEADER")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.refresh_token_header),
            token_store,
            debug_http: env_bool("CMS_DEBUG_HTTP")?.unwrap_or(defaults.debug_http),
            login_path: env::var("CMS_LOGIN_PATH").unwrap_or(defaults.login_path),
            default_page_size: env_parse("CMS_DEFAULT_PAGE_SIZE")?
                .unwrap_or(defaults.default_page_size),
            max_page_size: env_parse("CMS_MAX_PAGE_SIZE")?.unwrap_or(defaults.max_page_size),
        })
    }
}

fn parse_token_store(value: &str) -> TokenStoreKind {
    match value.trim() {
        "" | "memory" => TokenStoreKind::Memory,
        "none" | "disabled" => TokenStoreKind::Disabled,
        path => TokenStoreKind::File(PathBuf::from(path)),
    }
}

fn env_parse<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: v }),
        Err(_) => Ok(None),
    }
}

fn env_secs(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    Ok(env_parse::<u64>(name)?.map(Duration::from_secs))
}

fn env_bool(name: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { name, value: v }),
        },
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
