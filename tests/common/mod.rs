//! Shared fixtures for the HTTP integration tests
//!
//! `Post` is served at `/v1/posts` from a [`RecordingSource`], an in-memory
//! source that logs every call it receives and can be told to fail.

#![allow(dead_code)]

use axum_test::TestServer;
use restful::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub view_count: u32,
    pub tags: Vec<String>,
}

impl_record!(Post);
impl_identified!(Post, id);

impl Post {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: format!("{} body", title),
            ..Default::default()
        }
    }
}

/// A call received by [`RecordingSource`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindAll(HashMap<String, Vec<String>>),
    FindOne(String),
    FindMultiple(Vec<String>),
    Create(Post),
    Update(Post),
    Delete(String),
}

#[derive(Clone, Default)]
pub struct RecordingSource {
    inner: InMemorySource<Post>,
    calls: Arc<Mutex<Vec<Call>>>,
    failure: Arc<Mutex<Option<ApiError>>>,
}

impl RecordingSource {
    /// Store a post directly, bypassing the call log
    pub async fn seed(&self, post: Post) -> String {
        self.inner.create(post).await.unwrap()
    }

    pub async fn get(&self, id: &str) -> Option<Post> {
        self.inner.find_one(id, &Request::default()).await.ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: impl Into<ApiError>) {
        *self.failure.lock().unwrap() = Some(error.into());
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataSource<Post> for RecordingSource {
    async fn find_all(&self, request: &Request) -> ApiResult<Vec<Post>> {
        self.record(Call::FindAll(request.query_params.clone()))?;
        self.inner.find_all(request).await
    }

    async fn find_one(&self, id: &str, request: &Request) -> ApiResult<Post> {
        self.record(Call::FindOne(id.to_string()))?;
        self.inner.find_one(id, request).await
    }

    async fn find_multiple(&self, ids: &[String], request: &Request) -> ApiResult<Vec<Post>> {
        self.record(Call::FindMultiple(ids.to_vec()))?;
        self.inner.find_multiple(ids, request).await
    }

    async fn create(&self, record: Post) -> ApiResult<String> {
        self.record(Call::Create(record.clone()))?;
        self.inner.create(record).await
    }

    async fn update(&self, record: Post) -> ApiResult<()> {
        self.record(Call::Update(record.clone()))?;
        self.inner.update(record).await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.record(Call::Delete(id.to_string()))?;
        self.inner.delete(id).await
    }
}

pub struct Harness {
    pub server: TestServer,
    pub source: RecordingSource,
}

/// Serve `Post` at `/v1/posts` without a controller
pub fn harness() -> Harness {
    let source = RecordingSource::default();
    let mut api = Api::new("v1");
    api.add_resource::<Post>(source.clone());

    Harness {
        server: TestServer::new(api.router()),
        source,
    }
}

/// Serve `Post` at `/v1/posts` with `controller` attached
pub fn harness_with(controller: impl Controller<Post> + 'static) -> Harness {
    let source = RecordingSource::default();
    let mut api = Api::new("v1");
    api.add_resource_with_controller::<Post>(source.clone(), controller);

    Harness {
        server: TestServer::new(api.router()),
        source,
    }
}
