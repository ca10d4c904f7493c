//! Handler trait, type erasure, and shared-state binding.
//!
//! # How async handlers are stored
//!
//! Each route's handler has its own type, so registration wraps it in a
//! closure that boxes the handler's future and converts its output, then
//! stores that closure as `Arc<dyn Fn(Request) -> BoxFuture>`:
//!
//! ```text
//! async fn list(req: Request) -> Json<Vec<Post>>
//!        ↓ router.get("/api/posts", list)
//! Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response>>>>
//!        ↓ at request time
//! handler(req).await
//! ```
//!
//! # Shared state
//!
//! Handlers that need application state (the post store) are bound to it with
//! [`with_state`], which yields a closure satisfying [`Handler`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A route handler with its concrete type erased, shared across connections.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Automatically satisfied by any `async fn` (or closure) with the shape:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: the blanket impl below is the only one.
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod sealed {
    pub trait Sealed {}
}

impl<F, Fut, R> sealed::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(move |req: Request| {
            let fut = self(req);
            Box::pin(async move { fut.await.into_response() }) as BoxFuture
        })
    }
}

/// Binds `state` to a two-argument handler, producing a route handler.
///
/// Every request gets its own `Arc` clone of the state.
///
/// ```rust,ignore
/// let store = Arc::new(PostStore::seeded());
/// Router::new().get("/api/posts", with_state(store, handlers::list_posts));
/// ```
pub fn with_state<S, F, Fut, R>(state: Arc<S>, handler: F) -> impl Handler
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| handler(Arc::clone(&state), req)
}
