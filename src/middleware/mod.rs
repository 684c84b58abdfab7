// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request middleware (authentication, request logging).

pub mod auth;
pub mod trace;

pub use auth::AuthPipeline;
