//! Api: resource registration and router construction

use super::resource::{Resource, ResourceDescriptor, RouteInfo};
use crate::config::ApiConfig;
use crate::core::codec::RecordCodec;
use crate::core::controller::Controller;
use crate::core::error::RegistrationError;
use crate::core::naming::{EnglishNaming, NamingStrategy};
use crate::core::record::Record;
use crate::core::source::DataSource;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// A REST API made of registered resources
///
/// Resources are registered once at startup; [`router`](Self::router) then
/// produces an immutable axum router answering their routes.
///
/// # Example
///
/// ```ignore
/// let mut api = Api::new("v1");
/// api.add_resource::<Post>(InMemorySource::new())
///     .set_controller(PostController);
///
/// let app = api.router();
/// // GET /v1/posts, GET /v1/posts/{id}, POST /v1/posts, ...
/// ```
pub struct Api {
    prefix: String,
    naming: Arc<dyn NamingStrategy>,
    resources: Vec<Box<dyn ResourceDescriptor>>,
}

impl Api {
    /// Create an API whose routes all start with `prefix`
    ///
    /// The prefix is normalized to start and end with `/`: `"v1"`, `"/v1"`
    /// and `"/v1/"` all become `"/v1/"`, and an empty prefix becomes `"/"`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            naming: Arc::new(EnglishNaming),
            resources: Vec::new(),
        }
    }

    /// Create an API from configuration
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.prefix)
    }

    /// Use a custom naming strategy for resources registered afterwards
    pub fn with_naming(mut self, naming: impl NamingStrategy + 'static) -> Self {
        self.naming = Arc::new(naming);
        self
    }

    /// The normalized route prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register a resource for record type `T`
    ///
    /// The resource name is derived from `T`'s type name by the naming
    /// strategy (`Post` → `posts`). Returns the resource so that a controller
    /// can be attached.
    ///
    /// # Panics
    ///
    /// Registration errors are programmer errors and abort immediately:
    /// - `T::default()` does not serialize to a JSON object
    /// - two fields of `T` map to the same wire key
    /// - a resource with the same name is already registered
    pub fn add_resource<T: Record>(
        &mut self,
        source: impl DataSource<T> + 'static,
    ) -> &mut Resource<T> {
        match self.try_add_resource::<T>(Arc::new(source)) {
            Ok(resource) => resource,
            Err(e) => panic!("cannot register resource for `{}`: {}", T::type_name(), e),
        }
    }

    /// Register a resource together with its controller
    pub fn add_resource_with_controller<T: Record>(
        &mut self,
        source: impl DataSource<T> + 'static,
        controller: impl Controller<T> + 'static,
    ) -> &mut Resource<T> {
        self.add_resource(source).set_controller(controller)
    }

    fn try_add_resource<T: Record>(
        &mut self,
        source: Arc<dyn DataSource<T>>,
    ) -> Result<&mut Resource<T>, RegistrationError> {
        let name = self.naming.resource_name(T::type_name());
        if self.resources.iter().any(|r| r.name() == name) {
            return Err(RegistrationError::DuplicateName { name });
        }

        let codec = RecordCodec::<T>::new(name.clone(), Arc::clone(&self.naming))?;
        self.resources
            .push(Box::new(Resource::new(codec, source)));

        tracing::info!(
            resource = %name,
            record = T::type_name(),
            prefix = %self.prefix,
            "resource registered"
        );

        let Some(slot) = self.resources.last_mut() else {
            unreachable!("resource `{}` was just pushed", name);
        };
        match slot.as_any_mut().downcast_mut::<Resource<T>>() {
            Some(resource) => Ok(resource),
            None => unreachable!("resource `{}` holds a different record type", name),
        }
    }

    /// Names of all registered resources, in registration order
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.name()).collect()
    }

    /// The complete routing table
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.resources
            .iter()
            .flat_map(|r| r.routes(&self.prefix))
            .collect()
    }

    /// Build the router serving every registered resource
    ///
    /// The router shares the resources' data sources and controllers but is
    /// unaffected by later changes to this `Api`.
    pub fn router(&self) -> Router {
        self.resources
            .iter()
            .fold(Router::new(), |router, r| {
                router.merge(r.build_routes(&self.prefix))
            })
    }

    /// Serve the API with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests, tracing each one
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.router().layer(TraceLayer::new_for_http());
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            "Server listening on {} ({} resources)",
            addr,
            self.resources.len()
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new("")
    }
}

/// Add initial and trailing slash to a route prefix
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
