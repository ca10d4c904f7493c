//! postboard server binary.
//!
//! Run with:
//!   RUST_LOG=debug cargo run
//!
//! Try:
//!   curl 'http://localhost:5002/api/posts?sort=title&direction=desc'
//!   curl -X POST http://localhost:5002/api/posts \
//!        -H 'content-type: application/json' \
//!        -d '{"title":"Third post","content":"Hello"}'
//!   curl 'http://localhost:5002/api/posts/search?title=first'

use std::sync::Arc;

use postboard::posts::PostStore;
use postboard::{Config, Error, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let store = Arc::new(PostStore::seeded());
    info!(posts = store.len(), "post store seeded");

    Server::bind(config.bind_addr()?)
        .cors(config.cors())
        .serve(postboard::app(store))
        .await
}
