//! HTTP handlers dispatching requests to a resource's data source
//!
//! Handlers are generic over the record type and shared by every resource.
//! Each runs a fixed sequence (parse → data source → controller hook →
//! encode) and returns the first error it meets; the response, including
//! status and headers, is only assembled once every step has succeeded.

use crate::core::codec::RecordCodec;
use crate::core::controller::Hooks;
use crate::core::error::{ApiError, ApiResult, HttpError};
use crate::core::record::{Payload, Record};
use crate::core::request::Request;
use crate::core::source::DataSource;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{Path, Request as HttpRequest, State};
use axum::http::header::{ALLOW, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;

/// Largest request body accepted by create and update
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// `Allow` header of the collection path
pub const COLLECTION_ALLOW: &str = "GET,POST,OPTIONS";

/// `Allow` header of the single-item path
pub const ITEM_ALLOW: &str = "GET,PUT,DELETE,OPTIONS";

/// Read-only state shared by the handlers of one resource
pub(crate) struct ResourceState<T: Record> {
    pub name: String,
    pub prefix: String,
    pub codec: Arc<RecordCodec<T>>,
    pub source: Arc<dyn DataSource<T>>,
    pub hooks: Hooks<T>,
}

type ResourceRef<T> = State<Arc<ResourceState<T>>>;

/// List all records
///
/// GET /{resource}
pub(crate) async fn handle_index<T: Record>(
    State(resource): ResourceRef<T>,
    http_request: HttpRequest,
) -> Result<Response, ApiError> {
    tracing::debug!(resource = %resource.name, "list");
    let (parts, _) = http_request.into_parts();
    let request = Request::from_uri(&parts.uri)?;

    let mut records = resource.source.find_all(&request).await?;
    resource.hooks.find_all(&parts, &mut records).await?;

    respond_with(&resource.codec, &Payload::Many(records), StatusCode::OK)
}

/// Read one record, or several when `id` is a comma-separated list
///
/// GET /{resource}/{id}
pub(crate) async fn handle_read<T: Record>(
    State(resource): ResourceRef<T>,
    Path(id): Path<String>,
    http_request: HttpRequest,
) -> Result<Response, ApiError> {
    let (parts, _) = http_request.into_parts();
    let ids = split_ids(&id)?;
    tracing::debug!(resource = %resource.name, count = ids.len(), "read");
    let request = Request::from_uri(&parts.uri)?;

    let mut payload = match ids.as_slice() {
        [single] => Payload::One(resource.source.find_one(single, &request).await?),
        _ => Payload::Many(resource.source.find_multiple(&ids, &request).await?),
    };
    resource.hooks.find_one(&parts, &mut payload).await?;

    respond_with(&resource.codec, &payload, StatusCode::OK)
}

/// Create a record from the request body
///
/// POST /{resource}
pub(crate) async fn handle_create<T: Record>(
    State(resource): ResourceRef<T>,
    http_request: HttpRequest,
) -> Result<Response, ApiError> {
    tracing::debug!(resource = %resource.name, "create");
    let (parts, body) = http_request.into_parts();
    let body = read_body(body).await?;
    let request = Request::from_uri(&parts.uri)?.with_body(body.clone());

    let document = parse_document(&body)?;
    let mut record = resource.codec.decode_one(&document, T::default())?;
    resource.hooks.create(&parts, &mut record).await?;

    let id = resource.source.create(record).await?;
    let location = format!("{}{}/{}", resource.prefix, resource.name, id);
    let location = HeaderValue::from_str(&location)
        .map_err(|e| ApiError::internal(format!("invalid Location header '{}': {}", location, e)))?;

    let stored = resource.source.find_one(&id, &request).await?;
    let mut response = respond_with(&resource.codec, &Payload::One(stored), StatusCode::CREATED)?;
    response.headers_mut().insert(LOCATION, location);

    Ok(response)
}

/// Update the fields present in the request body
///
/// PUT /{resource}/{id}
pub(crate) async fn handle_update<T: Record>(
    State(resource): ResourceRef<T>,
    Path(id): Path<String>,
    http_request: HttpRequest,
) -> Result<Response, ApiError> {
    tracing::debug!(resource = %resource.name, id = %id, "update");
    let (parts, body) = http_request.into_parts();
    let body = read_body(body).await?;
    let request = Request::from_uri(&parts.uri)?.with_body(body.clone());

    let existing = resource.source.find_one(&id, &request).await?;
    let document = parse_document(&body)?;
    if let Some(body_id) = resource.codec.document_id(&document)? {
        if body_id != id {
            return Err(HttpError::conflict(format!(
                "id '{}' in the document does not match id '{}' in the path",
                body_id, id
            ))
            .into());
        }
    }
    let mut record = resource.codec.decode_one(&document, existing)?;
    resource.hooks.update(&parts, &mut record).await?;

    resource.source.update(record).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Delete a record
///
/// DELETE /{resource}/{id}
pub(crate) async fn handle_delete<T: Record>(
    State(resource): ResourceRef<T>,
    Path(id): Path<String>,
    http_request: HttpRequest,
) -> Result<Response, ApiError> {
    tracing::debug!(resource = %resource.name, id = %id, "delete");
    let (parts, _) = http_request.into_parts();

    resource.hooks.delete(&parts, &id).await?;
    resource.source.delete(&id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// OPTIONS /{resource}
pub(crate) async fn collection_options() -> Response {
    (StatusCode::NO_CONTENT, [(ALLOW, COLLECTION_ALLOW)]).into_response()
}

/// OPTIONS /{resource}/{id}
pub(crate) async fn item_options() -> Response {
    (StatusCode::NO_CONTENT, [(ALLOW, ITEM_ALLOW)]).into_response()
}

/// HEAD /{resource}
pub(crate) async fn collection_head() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, COLLECTION_ALLOW)]).into_response()
}

/// HEAD /{resource}/{id}
pub(crate) async fn item_head() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, ITEM_ALLOW)]).into_response()
}

fn split_ids(raw: &str) -> ApiResult<Vec<String>> {
    let ids: Vec<String> = raw.split(',').map(str::to_owned).collect();
    if ids.iter().any(String::is_empty) {
        return Err(HttpError::bad_request(format!("Invalid id list: '{}'", raw)).into());
    }
    Ok(ids)
}

async fn read_body(body: Body) -> ApiResult<Bytes> {
    to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| HttpError::bad_request(format!("Failed to read request body: {}", e)).into())
}

fn parse_document(body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| HttpError::bad_request(format!("Invalid JSON body: {}", e)).into())
}

fn respond_with<T: Record>(
    codec: &RecordCodec<T>,
    payload: &Payload<T>,
    status: StatusCode,
) -> ApiResult<Response> {
    let body = codec.encode(payload)?;
    Ok((status, [(CONTENT_TYPE, "application/json")], body).into_response())
}
