// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed clients for the content endpoints.
//!
//! Every call goes through [`AuthPipeline`], so callers never deal with
//! tokens or refreshes.

use crate::error::ClientError;
use crate::middleware::AuthPipeline;
use crate::models::{
    BatchOperationRequest, BatchOperationResponse, Category, Comment, Page, PageParams, Post,
    SiteMeta, Tag,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::ops::Deref;

/// Page size limits applied to list queries.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

/// CRUD operations shared by every collection.
#[derive(Clone)]
pub struct ResourceApi<T> {
    pipeline: AuthPipeline,
    collection: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T> ResourceApi<T>
where
    T: DeserializeOwned + Serialize,
{
    fn new(pipeline: AuthPipeline, collection: &'static str) -> Self {
        Self {
            pipeline,
            collection,
            _item: PhantomData,
        }
    }

    fn item_path(&self, id: u64) -> String {
        format!("{}/{}", self.collection, id)
    }

    pub async fn get(&self, id: u64) -> Result<T, ClientError> {
        self.pipeline
            .get_json(&self.item_path(id), &[] as &[(&str, &str)])
            .await
    }

    pub async fn create(&self, item: &T) -> Result<T, ClientError> {
        self.pipeline
            .send_json(Method::POST, self.collection, Some(item))
            .await
    }

    /// Update with a full item or any partial JSON patch.
    pub async fn update<B>(&self, id: u64, patch: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.pipeline
            .send_json(Method::PUT, &self.item_path(id), Some(patch))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.pipeline
            .send_unit::<()>(Method::DELETE, &self.item_path(id), None)
            .await
    }

    /// `POST /{collection}/batch` with `action: "delete"`.
    pub async fn delete_many(&self, ids: &[u64]) -> Result<BatchOperationResponse, ClientError> {
        let request = BatchOperationRequest {
            ids: ids.to_vec(),
            action: "delete".to_string(),
        };
        let result: BatchOperationResponse = self
            .pipeline
            .send_json(
                Method::POST,
                &format!("{}/batch", self.collection),
                Some(&request),
            )
            .await?;

        if !result.failed_list.is_empty() {
            tracing::warn!(
                collection = self.collection,
                failed = ?result.failed_list,
                "Batch delete partially failed"
            );
        }
        Ok(result)
    }

    /// `PUT /{collection}/{id}/{action}` with no body.
    async fn put_action(&self, id: u64, action: &str) -> Result<T, ClientError> {
        self.pipeline
            .send_json::<T, ()>(
                Method::PUT,
                &format!("{}/{}", self.item_path(id), action),
                None,
            )
            .await
    }
}

#[derive(Clone)]
pub struct PostApi {
    api: ResourceApi<Post>,
    limits: PageLimits,
}

impl PostApi {
    /// One page of posts, newest first unless `params` says otherwise.
    pub async fn list(&self, params: &PageParams) -> Result<Page<Post>, ClientError> {
        let query = params.to_query(self.limits.default_size, self.limits.max_size);
        self.api.pipeline.get_page("posts", &query).await
    }

    pub async fn publish(&self, id: u64) -> Result<Post, ClientError> {
        self.api.put_action(id, "publish").await
    }

    pub async fn archive(&self, id: u64) -> Result<Post, ClientError> {
        self.api.put_action(id, "archive").await
    }
}

impl Deref for PostApi {
    type Target = ResourceApi<Post>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

#[derive(Clone)]
pub struct CommentApi {
    api: ResourceApi<Comment>,
    limits: PageLimits,
}

impl CommentApi {
    /// One page of comments, optionally only those on `post_id`.
    pub async fn list(
        &self,
        params: &PageParams,
        post_id: Option<u64>,
    ) -> Result<Page<Comment>, ClientError> {
        let mut query = params.to_query(self.limits.default_size, self.limits.max_size);
        if let Some(post_id) = post_id {
            query.push(("contentID", post_id.to_string()));
        }
        self.api.pipeline.get_page("comments", &query).await
    }

    pub async fn approve(&self, id: u64) -> Result<Comment, ClientError> {
        self.api.put_action(id, "approve").await
    }

    pub async fn reject(&self, id: u64) -> Result<Comment, ClientError> {
        self.api.put_action(id, "reject").await
    }
}

impl Deref for CommentApi {
    type Target = ResourceApi<Comment>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

#[derive(Clone)]
pub struct TagApi {
    api: ResourceApi<Tag>,
}

impl TagApi {
    /// All tags, filtered by name when `search` is given.
    pub async fn list_all(&self, search: Option<&str>) -> Result<Vec<Tag>, ClientError> {
        let query: Vec<(&str, &str)> = search.map(|s| ("search", s)).into_iter().collect();
        self.api.pipeline.get_json("tags", &query).await
    }
}

impl Deref for TagApi {
    type Target = ResourceApi<Tag>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

#[derive(Clone)]
pub struct CategoryApi {
    api: ResourceApi<Category>,
}

impl CategoryApi {
    /// All categories; with `include_children` the backend nests subcategories.
    pub async fn list_all(&self, include_children: bool) -> Result<Vec<Category>, ClientError> {
        let query: &[(&str, &str)] = if include_children {
            &[("includeChildren", "true")]
        } else {
            &[]
        };
        self.api.pipeline.get_json("categories", query).await
    }
}

impl Deref for CategoryApi {
    type Target = ResourceApi<Category>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

#[derive(Clone)]
pub struct MetaApi {
    pipeline: AuthPipeline,
}

impl MetaApi {
    pub async fn get(&self) -> Result<SiteMeta, ClientError> {
        self.pipeline
            .get_json("meta", &[] as &[(&str, &str)])
            .await
    }
}

/// All content clients, sharing one pipeline.
#[derive(Clone)]
pub struct Resources {
    pub posts: PostApi,
    pub comments: CommentApi,
    pub tags: TagApi,
    pub categories: CategoryApi,
    pub meta: MetaApi,
}

impl Resources {
    pub fn new(pipeline: AuthPipeline, limits: PageLimits) -> Self {
        Self {
            posts: PostApi {
                api: ResourceApi::new(pipeline.clone(), "posts"),
                limits,
            },
            comments: CommentApi {
                api: ResourceApi::new(pipeline.clone(), "comments"),
                limits,
            },
            tags: TagApi {
                api: ResourceApi::new(pipeline.clone(), "tags"),
            },
            categories: CategoryApi {
                api: ResourceApi::new(pipeline.clone(), "categories"),
            },
            meta: MetaApi { pipeline },
        }
    }
}
