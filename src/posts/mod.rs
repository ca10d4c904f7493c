//! The post service: an in-memory, ordered collection of posts behind five
//! JSON endpoints.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/api/posts?sort={title,content}&direction={asc,desc}` | 200, array |
//! | POST | `/api/posts` | 201, created post |
//! | DELETE | `/api/posts/{id}` | 200, `{message}` |
//! | PUT | `/api/posts/{id}` | 200, `{id,title,content}` |
//! | GET | `/api/posts/search?title=&content=` | 200, array |
//!
//! Failures are `{"error": "..."}` with 400 ([`PostError::InvalidArgument`])
//! or 404 ([`PostError::NotFound`]).

mod error;
mod model;
mod store;

pub mod handlers;

use std::sync::Arc;

pub use error::PostError;
pub use model::{NewPost, Post, PostSummary, PostUpdate, SearchQuery, SortDirection, SortField, SortOrder};
pub use store::PostStore;

use crate::handler::with_state;
use crate::router::Router;

/// Registers the post endpoints on `router`, all sharing `store`.
pub fn routes(router: Router, store: Arc<PostStore>) -> Router {
    router
        .get("/api/posts", with_state(Arc::clone(&store), handlers::list_posts))
        .post("/api/posts", with_state(Arc::clone(&store), handlers::create_post))
        .get("/api/posts/search", with_state(Arc::clone(&store), handlers::search_posts))
        .put("/api/posts/{id}", with_state(Arc::clone(&store), handlers::update_post))
        .delete("/api/posts/{id}", with_state(store, handlers::delete_post))
}
