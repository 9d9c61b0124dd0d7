//! Data source trait: the persistence collaborator behind each resource

use crate::core::error::ApiResult;
use crate::core::record::Record;
use crate::core::request::Request;
use async_trait::async_trait;

/// Persistence operations for one resource
///
/// The dispatch engine calls a data source from many requests at once, so
/// implementations must be `Send + Sync`; whether concurrent calls are
/// *correct* is up to the implementation.
///
/// Failures should be classified as [`HttpError`](crate::core::error::HttpError)
/// (404 for unknown IDs, 409 for conflicts, ...). Anything else is reported
/// to the client as a bare 500.
#[async_trait]
pub trait DataSource<T: Record>: Send + Sync {
    /// Return all records
    async fn find_all(&self, request: &Request) -> ApiResult<Vec<T>>;

    /// Return the record with the given ID
    async fn find_one(&self, id: &str, request: &Request) -> ApiResult<T>;

    /// Return the records for the given IDs
    async fn find_multiple(&self, ids: &[String], request: &Request) -> ApiResult<Vec<T>>;

    /// Store a new record and return its ID
    async fn create(&self, record: T) -> ApiResult<String>;

    /// Replace a stored record
    async fn update(&self, record: T) -> ApiResult<()>;

    /// Delete the record with the given ID
    async fn delete(&self, id: &str) -> ApiResult<()>;
}
