// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as Unix seconds.
pub fn now_unix_secs() -> i64 {
    Utc::now().timestamp()
}

/// Format a Unix timestamp as RFC3339 using a `Z` suffix.
///
/// Out-of-range timestamps render as `"invalid"`; this is only used for logs.
pub fn format_unix_rfc3339(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "invalid".to_string())
}
