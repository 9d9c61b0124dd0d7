//! Blog API Example
//!
//! Serves a `posts` resource from an in-memory source:
//! - Full CRUD under the configured prefix
//! - Deleting a post requires an `Authorization` header
//! - New posts get a `draft` status unless one is given
//!
//! Run with an optional YAML config:
//! ```sh
//! RUST_LOG=restful=debug cargo run --example blog_api -- blog.yaml
//! ```

use axum::http::header::AUTHORIZATION;
use restful::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub view_count: u32,
}

impl_record!(Post);
impl_identified!(Post, id);

struct PostController;

#[async_trait]
impl Controller<Post> for PostController {
    async fn create(&self, _parts: &Parts, post: &mut Post) -> ApiResult<()> {
        if post.status.is_empty() {
            post.status = "draft".to_string();
        }
        Ok(())
    }

    async fn delete(&self, parts: &Parts, id: &str) -> ApiResult<()> {
        if parts.headers.contains_key(AUTHORIZATION) {
            tracing::info!(id, "post deleted");
            Ok(())
        } else {
            Err(HttpError::unauthorized("Deleting a post requires authorization").into())
        }
    }
}

async fn seed(source: &InMemorySource<Post>) -> ApiResult<()> {
    for (title, status) in [("Hello, world", "published"), ("Work in progress", "draft")] {
        source
            .create(Post {
                title: title.to_string(),
                body: format!("{} body", title),
                status: status.to_string(),
                ..Default::default()
            })
            .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ApiConfig::from_yaml_file(path)?,
        None => ApiConfig::default(),
    };

    let posts = InMemorySource::<Post>::new();
    seed(&posts).await?;

    let mut api = Api::from_config(&config);
    api.add_resource_with_controller::<Post>(posts, PostController);

    println!("🚀 Blog API on http://{}", config.listen);
    for route in api.routes() {
        println!("    {:<8} {:<24} - {}", route.method, route.path, route.operation);
    }

    api.serve(&config.listen).await
}
