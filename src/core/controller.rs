//! Controller hooks invoked around each resource operation

use crate::core::error::ApiResult;
use crate::core::record::{Payload, Record};
use async_trait::async_trait;
use axum::http::request::Parts;
use std::sync::Arc;

/// Per-resource interceptor for cross-cutting concerns (authorization,
/// filtering, redaction, defaults).
///
/// Every hook receives the inbound request head (method, URI, headers,
/// extensions) and the in-flight value. Returning an error aborts the
/// request with that error.
///
/// - `find_all` / `find_one` run **after** the data source fetched the
///   records and may rewrite them.
/// - `create` / `update` / `delete` run **before** the data source mutation;
///   failing prevents it.
#[async_trait]
pub trait Controller<T: Record>: Send + Sync {
    /// Hooks left unimplemented accept the request unchanged.
    async fn find_all(&self, _request: &Parts, _records: &mut Vec<T>) -> ApiResult<()> {
        Ok(())
    }

    async fn find_one(&self, _request: &Parts, _records: &mut Payload<T>) -> ApiResult<()> {
        Ok(())
    }

    async fn create(&self, _request: &Parts, _record: &mut T) -> ApiResult<()> {
        Ok(())
    }

    async fn update(&self, _request: &Parts, _record: &mut T) -> ApiResult<()> {
        Ok(())
    }

    async fn delete(&self, _request: &Parts, _id: &str) -> ApiResult<()> {
        Ok(())
    }
}

/// The hook chain of a resource, fixed when the resource is registered
pub enum Hooks<T: Record> {
    /// No controller: every hook succeeds without doing anything
    None,
    Controller(Arc<dyn Controller<T>>),
}

impl<T: Record> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        match self {
            Hooks::None => Hooks::None,
            Hooks::Controller(c) => Hooks::Controller(Arc::clone(c)),
        }
    }
}

impl<T: Record> Default for Hooks<T> {
    fn default() -> Self {
        Hooks::None
    }
}

impl<T: Record> Hooks<T> {
    pub fn is_none(&self) -> bool {
        matches!(self, Hooks::None)
    }

    pub async fn find_all(&self, request: &Parts, records: &mut Vec<T>) -> ApiResult<()> {
        match self {
            Hooks::None => Ok(()),
            Hooks::Controller(c) => c.find_all(request, records).await,
        }
    }

    pub async fn find_one(&self, request: &Parts, records: &mut Payload<T>) -> ApiResult<()> {
        match self {
            Hooks::None => Ok(()),
            Hooks::Controller(c) => c.find_one(request, records).await,
        }
    }

    pub async fn create(&self, request: &Parts, record: &mut T) -> ApiResult<()> {
        match self {
            Hooks::None => Ok(()),
            Hooks::Controller(c) => c.create(request, record).await,
        }
    }

    pub async fn update(&self, request: &Parts, record: &mut T) -> ApiResult<()> {
        match self {
            Hooks::None => Ok(()),
            Hooks::Controller(c) => c.update(request, record).await,
        }
    }

    pub async fn delete(&self, request: &Parts, id: &str) -> ApiResult<()> {
        match self {
            Hooks::None => Ok(()),
            Hooks::Controller(c) => c.delete(request, id).await,
        }
    }
}
