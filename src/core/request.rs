//! Per-request context handed to data sources

use crate::core::error::{ApiResult, HttpError};
use axum::body::Bytes;
use axum::extract::Query;
use axum::http::Uri;
use std::collections::HashMap;

/// Request context for one inbound call
///
/// Every query parameter is exposed as an ordered list of comma-split
/// values, so `?include=author,comments&page=2` becomes
/// `{"include": ["author", "comments"], "page": ["2"]}`. A key given several
/// times accumulates its values in order of appearance.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub query_params: HashMap<String, Vec<String>>,

    /// Raw body for create and update calls
    pub body: Option<Bytes>,
}

impl Request {
    /// Build the context from the query string of the request URI
    pub fn from_uri(uri: &Uri) -> ApiResult<Self> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|e| HttpError::bad_request(format!("Invalid query string: {}", e.body_text())))?;
        Ok(Self::from_pairs(pairs))
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query_params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            query_params
                .entry(key)
                .or_default()
                .extend(value.split(',').map(str::to_owned));
        }

        Self {
            query_params,
            body: None,
        }
    }

    /// Attach the raw request body
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// All values of a query parameter
    pub fn param(&self, key: &str) -> Option<&[String]> {
        self.query_params.get(key).map(Vec::as_slice)
    }

    /// First value of a query parameter
    pub fn first(&self, key: &str) -> Option<&str> {
        self.param(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
