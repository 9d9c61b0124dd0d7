//! # restful-rs
//!
//! A generic CRUD-over-HTTP resource layer built on axum.
//!
//! ## Features
//!
//! - **Resource dispatch**: verb + resource name + optional ID routed to a data source
//! - **Generic record codec**: JSON documents ⇄ typed records, with partial-update merge
//! - **Controller hooks**: intercept, mutate or veto each operation per resource
//! - **Error translation**: one place turning errors into HTTP responses and log lines
//! - **Auto-Pluralization**: resource names derived from type names (Category → categories)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restful::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! pub struct Post {
//!     pub id: String,
//!     pub title: String,
//!     pub view_count: u32, // "viewCount" on the wire
//! }
//!
//! impl_record!(Post);
//! impl_identified!(Post, id);
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut api = Api::new("v1");
//!     api.add_resource::<Post>(InMemorySource::new());
//!
//!     // GET/POST /v1/posts, GET/PUT/DELETE /v1/posts/{id}
//!     api.serve("127.0.0.1:3000").await
//! }
//! ```

pub mod config;
pub mod core;
mod macros;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        codec::RecordCodec,
        controller::{Controller, Hooks},
        naming::{EnglishNaming, NamingStrategy, Pluralizer},
        record::{Payload, Record},
        request::Request,
        source::DataSource,
    };

    // === Errors ===
    pub use crate::core::error::{
        ApiError, ApiResult, DecodeError, ErrorObject, HttpError, RegistrationError,
    };

    // === Macros ===
    pub use crate::{impl_identified, impl_record};

    // === Storage ===
    pub use crate::storage::{IdStrategy, Identified, InMemorySource};

    // === Config ===
    pub use crate::config::ApiConfig;

    // === Server ===
    pub use crate::server::{Api, Operation, Resource, RouteInfo};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        http::{StatusCode, request::Parts},
    };
}
