//! Registered resources and the routes derived from them

use super::handlers::{self, ResourceState};
use crate::core::codec::RecordCodec;
use crate::core::controller::{Controller, Hooks};
use crate::core::record::Record;
use crate::core::source::DataSource;
use axum::Router;
use axum::http::Method;
use axum::routing::get;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Operation a route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Capability probe on the collection path
    CollectionOptions,
    /// Capability probe on the single-item path
    ItemOptions,
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CollectionOptions | Operation::ItemOptions => "options",
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One entry of the routing table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteInfo {
    pub method: Method,
    /// Path in router syntax, e.g. `/v1/posts/{id}`
    pub path: String,
    pub operation: Operation,
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Type-erased view of a registered resource
///
/// Lets the [`Api`](super::Api) keep resources of different record types in
/// one registry and build their routes.
pub trait ResourceDescriptor: Send + Sync {
    /// The resource name (lowercase plural, e.g. `posts`)
    fn name(&self) -> &str;

    /// Bare name of the record type
    fn type_name(&self) -> &'static str;

    /// The seven routes this resource answers under `prefix`
    fn routes(&self, prefix: &str) -> Vec<RouteInfo>;

    /// Build the router serving [`routes`](Self::routes)
    fn build_routes(&self, prefix: &str) -> Router;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A record type bound to its data source and optional controller
pub struct Resource<T: Record> {
    name: String,
    codec: Arc<RecordCodec<T>>,
    source: Arc<dyn DataSource<T>>,
    hooks: Hooks<T>,
}

impl<T: Record> Resource<T> {
    pub(crate) fn new(codec: RecordCodec<T>, source: Arc<dyn DataSource<T>>) -> Self {
        Self {
            name: codec.resource_name().to_string(),
            codec: Arc::new(codec),
            source,
            hooks: Hooks::None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codec(&self) -> &RecordCodec<T> {
        &self.codec
    }

    /// Attach a controller, replacing any previous one
    ///
    /// Routers built before this call keep the hooks they were built with.
    pub fn set_controller(&mut self, controller: impl Controller<T> + 'static) -> &mut Self {
        tracing::debug!(resource = %self.name, "controller attached");
        self.hooks = Hooks::Controller(Arc::new(controller));
        self
    }

    pub fn has_controller(&self) -> bool {
        !self.hooks.is_none()
    }
}

/// `<prefix><name>`
pub fn collection_path(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name)
}

/// `<prefix><name>/{id}`
pub fn item_path(prefix: &str, name: &str) -> String {
    format!("{}{}/{{id}}", prefix, name)
}

impl<T: Record> ResourceDescriptor for Resource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn routes(&self, prefix: &str) -> Vec<RouteInfo> {
        let collection = collection_path(prefix, &self.name);
        let item = item_path(prefix, &self.name);
        let route = |method: Method, path: &str, operation| RouteInfo {
            method,
            path: path.to_string(),
            operation,
        };

        vec![
            route(Method::OPTIONS, &collection, Operation::CollectionOptions),
            route(Method::OPTIONS, &item, Operation::ItemOptions),
            route(Method::GET, &collection, Operation::List),
            route(Method::GET, &item, Operation::Read),
            route(Method::POST, &collection, Operation::Create),
            route(Method::PUT, &item, Operation::Update),
            route(Method::DELETE, &item, Operation::Delete),
        ]
    }

    fn build_routes(&self, prefix: &str) -> Router {
        let state = Arc::new(ResourceState {
            name: self.name.clone(),
            prefix: prefix.to_string(),
            codec: Arc::clone(&self.codec),
            source: Arc::clone(&self.source),
            hooks: self.hooks.clone(),
        });

        Router::new()
            .route(
                &collection_path(prefix, &self.name),
                get(handlers::handle_index::<T>)
                    .post(handlers::handle_create::<T>)
                    .options(handlers::collection_options)
                    .head(handlers::collection_head),
            )
            .route(
                &item_path(prefix, &self.name),
                get(handlers::handle_read::<T>)
                    .put(handlers::handle_update::<T>)
                    .delete(handlers::handle_delete::<T>)
                    .options(handlers::item_options)
                    .head(handlers::item_head),
            )
            .with_state(state)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
