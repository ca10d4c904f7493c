//! # postboard
//!
//! An in-memory posts API: list with sorting, create, update, delete and
//! search over one shared, ordered collection, served as JSON.
//!
//! The HTTP layer underneath is deliberately small:
//!
//! - Radix-tree routing, O(path-length) lookup via [`matchit`]
//! - hyper for HTTP/1.1 and HTTP/2 on tokio
//! - CORS and per-request tracing as built-in [`middleware`]
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests
//!
//! Nothing is persisted. The collection is seeded with two posts at startup
//! and lost on exit.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use postboard::{Router, Server, health, posts};
//! use postboard::middleware::Cors;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), postboard::Error> {
//!     let store = Arc::new(posts::PostStore::seeded());
//!     let app = posts::routes(Router::new(), store)
//!         .get("/healthz", health::liveness);
//!
//!     Server::bind(([0, 0, 0, 0], 5002).into())
//!         .cors(Cors::permissive())
//!         .serve(app)
//!         .await
//! }
//! ```

mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod health;
pub mod middleware;
pub mod posts;

pub use config::Config;
pub use error::Error;
pub use handler::{Handler, with_state};
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;

/// Everything the service serves: the post endpoints and both health probes.
pub fn app(store: std::sync::Arc<posts::PostStore>) -> Router {
    posts::routes(Router::new(), store)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}
