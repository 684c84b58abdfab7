// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the client.

pub mod content;
pub mod envelope;
pub mod tokens;
pub mod user;

pub use content::{
    BatchOperationRequest, BatchOperationResponse, Category, Comment, CommentStatus, Post,
    PostKind, PostStatus, SiteMeta, Tag,
};
pub use envelope::{ApiResponse, Page, PageInfo, PageParams, PaginatedResponse};
pub use tokens::{normalize_token, TokenPair};
pub use user::{LoginCredentials, Role, UserIdentity};
