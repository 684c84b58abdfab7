// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - token lifecycle and session logic.

pub mod auth;
pub mod backend;
pub mod claims;
pub mod coordinator;
pub mod session;

pub use auth::AuthService;
pub use backend::BackendClient;
pub use claims::Claims;
pub use coordinator::{RefreshCoordinator, RefreshStatus};
pub use session::{LogRedirect, LoginRedirect, Session, SessionState};
