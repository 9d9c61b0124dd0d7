//! HTTP surface: resource registration, routing and request dispatch
//!
//! [`Api`] collects resources at startup and turns them into an axum
//! router. Every resource answers the same seven routes:
//! - `OPTIONS` on the collection and item paths
//! - `GET` on the collection (list) and on an item (read one or several)
//! - `POST` on the collection (create)
//! - `PUT` and `DELETE` on an item

pub mod api;
pub(crate) mod handlers;
pub mod resource;

pub use api::{Api, normalize_prefix};
pub use handlers::{BODY_LIMIT, COLLECTION_ALLOW, ITEM_ALLOW};
pub use resource::{Operation, Resource, ResourceDescriptor, RouteInfo};
