// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uniform response envelope used by every backend endpoint.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// `{success, data, message?, code?}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap `data`, turning `success: false` into a server error.
    pub fn into_data(self, status: u16) -> Result<T, ClientError> {
        if !self.success {
            return Err(ClientError::Server {
                status,
                code: self.code,
                message: self
                    .message
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            });
        }
        self.data
            .ok_or_else(|| ClientError::InvalidResponse("missing data field".to_string()))
    }

    /// Like [`ApiResponse::into_data`] for endpoints whose `data` is empty.
    pub fn ensure_success(self, status: u16) -> Result<(), ClientError> {
        if self.success {
            return Ok(());
        }
        Err(ClientError::Server {
            status,
            code: self.code,
            message: self
                .message
                .unwrap_or_else(|| "Unknown error occurred".to_string()),
        })
    }
}

/// Pagination block of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

/// Envelope of paginated list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub message: Option<String>,
    pub page: Option<PageInfo>,
}

impl<T> PaginatedResponse<T> {
    /// Fail on `success: false`, like [`ApiResponse::into_data`].
    pub fn into_page(self, status: u16) -> Result<Page<T>, ClientError> {
        if !self.success {
            return Err(ClientError::Server {
                status,
                code: None,
                message: self
                    .message
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            });
        }
        let info = self.page.unwrap_or(PageInfo {
            current_page: 0,
            page_size: self.data.len() as u32,
            total_count: self.data.len() as u64,
            total_pages: 1,
        });
        Ok(Page {
            items: self.data,
            info,
        })
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.info.current_page + 1 < self.info.total_pages
    }
}

/// Query parameters for paginated lists.
///
/// `page_index` is 1-based; the backend counts from 0.
#[derive(Debug, Clone)]
pub struct PageParams {
    pub page_index: u32,
    pub page_size: Option<u32>,
    pub order_by: Option<String>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: None,
            order_by: None,
        }
    }
}

impl PageParams {
    pub fn page(page_index: u32) -> Self {
        Self {
            page_index,
            ..Self::default()
        }
    }

    /// Render as query pairs, applying the configured size defaults.
    pub fn to_query(&self, default_size: u32, max_size: u32) -> Vec<(&'static str, String)> {
        let size = self.page_size.unwrap_or(default_size).clamp(1, max_size.max(1));
        vec![
            ("pageIndex", self.page_index.saturating_sub(1).to_string()),
            ("pageSize", size.to_string()),
            (
                "orderBy",
                self.order_by
                    .clone()
                    .unwrap_or_else(|| "created_at desc".to_string()),
            ),
        ]
    }
}

/// Backends send `code` either as a number or a string.
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
