//! Typed error handling and the HTTP error translator
//!
//! Every layer of the dispatch engine (codec, data sources, controllers,
//! handlers) returns [`ApiError`]. The [`IntoResponse`] implementation on
//! [`ApiError`] is the single place where a failure becomes a status code,
//! a response body and a log line.
//!
//! # Error Categories
//!
//! - [`ApiError::Http`]: a classified failure carrying its own status code and
//!   optional structured sub-errors (see [`HttpError`])
//! - [`ApiError::Decode`]: a request document could not be turned into a record
//! - [`ApiError::Internal`]: anything unclassified; reported as a bare 500
//!
//! # Example
//!
//! ```rust,ignore
//! use restful::prelude::*;
//!
//! async fn find_one(&self, id: &str, _req: &Request) -> ApiResult<Post> {
//!     self.posts
//!         .get(id)
//!         .cloned()
//!         .ok_or_else(|| HttpError::not_found(format!("post with id '{}' not found", id)).into())
//! }
//! ```

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The error type flowing through every request
#[derive(Debug)]
pub enum ApiError {
    /// Classified error with an explicit HTTP status
    Http(HttpError),

    /// The request document could not be decoded into a record
    Decode(DecodeError),

    /// Unclassified failure; never exposed to clients
    Internal(anyhow::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "{}", e),
            ApiError::Decode(e) => write!(f, "{}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {:#}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            ApiError::Internal(e) => Some(&**e),
        }
    }
}

impl ApiError {
    /// Shortcut for an unclassified error built from a message
    pub fn internal(message: impl fmt::Display) -> Self {
        ApiError::Internal(anyhow::anyhow!("{}", message))
    }

    /// Get the HTTP status code this error translates to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Http(e) => e.status,
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        match self {
            ApiError::Http(e) => e.into_response(),
            ApiError::Decode(e) => HttpError::from(e).into_response(),
            // Internals stay in the log
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

// =============================================================================
// HTTP Errors
// =============================================================================

/// An error with an explicit HTTP status
///
/// Constructed by data sources and controllers to classify their failures.
/// When `errors` is non-empty the client receives them as a JSON
/// `{"errors": [...]}` document, otherwise the plain `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpError {
    /// Status code sent to the client
    pub status: StatusCode,

    /// Human-readable message, used as the body when there are no sub-errors
    pub message: String,

    /// Optional structured sub-errors
    pub errors: Vec<ErrorObject>,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Append one structured sub-error
    pub fn with_error(mut self, error: ErrorObject) -> Self {
        self.errors.push(error);
        self
    }

    /// Append several structured sub-errors, keeping their order
    pub fn with_errors(mut self, errors: impl IntoIterator<Item = ErrorObject>) -> Self {
        self.errors.extend(errors);
        self
    }

    /// The structured error document, if there are sub-errors
    pub fn to_document(&self) -> Option<ErrorDocument<'_>> {
        if self.errors.is_empty() {
            None
        } else {
            Some(ErrorDocument {
                errors: &self.errors,
            })
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let document = self.to_document().map(|doc| serde_json::to_vec(&doc));
        match document {
            Some(Ok(body)) => (self.status, [(CONTENT_TYPE, "application/json")], body).into_response(),
            Some(Err(e)) => {
                tracing::error!(error = %e, "failed to serialize error document");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            None => (self.status, self.message).into_response(),
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        ApiError::Http(err)
    }
}

/// Wire form of a structured error list
#[derive(Debug, Serialize)]
pub struct ErrorDocument<'a> {
    pub errors: &'a [ErrorObject],
}

/// A single structured error entry (JSON-API style)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// HTTP status as a string, e.g. `"403"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Application-specific error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Short summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// What part of the request caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

impl ErrorObject {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16().to_string());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.source = Some(ErrorSource {
            pointer: pointer.into(),
        });
        self
    }
}

/// JSON pointer into the request document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSource {
    pub pointer: String,
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Failures while turning a wire document into records
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The document does not have a recognizable shape
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// A field value cannot be converted to the field's declared type
    #[error("Invalid value for field '{field}': {message}")]
    FieldType { field: String, message: String },

    /// The merged record was rejected for a reason not tied to one field
    #[error("Invalid record: {message}")]
    Record { message: String },
}

impl DecodeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DecodeError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            DecodeError::FieldType { .. } => "INVALID_FIELD",
            DecodeError::Record { .. } => "INVALID_RECORD",
        }
    }
}

impl From<DecodeError> for HttpError {
    fn from(err: DecodeError) -> Self {
        let mut entry = ErrorObject::new("Invalid request document")
            .with_status(StatusCode::BAD_REQUEST)
            .with_code(err.error_code())
            .with_detail(err.to_string());
        if let DecodeError::FieldType { field, .. } = &err {
            entry = entry.with_pointer(format!("/{}", field));
        }
        HttpError::bad_request(err.to_string()).with_error(entry)
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::Decode(err)
    }
}

// =============================================================================
// Registration Errors
// =============================================================================

/// Programmer errors detected while registering a resource
///
/// `Api::add_resource` treats these as fatal.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("record type `{type_name}` must be a plain struct serializing to a JSON object, got {found}")]
    NotAStruct {
        type_name: &'static str,
        found: &'static str,
    },

    #[error("record type `{type_name}` cannot be serialized: {message}")]
    Prototype {
        type_name: &'static str,
        message: String,
    },

    #[error("fields '{first}' and '{second}' of `{type_name}` both map to wire key '{wire_key}'")]
    AmbiguousField {
        type_name: &'static str,
        first: String,
        second: String,
        wire_key: String,
    },

    #[error("a resource named '{name}' is already registered")]
    DuplicateName { name: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for dispatch operations
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Tests
// =============================================================================
