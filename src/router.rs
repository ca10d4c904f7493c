//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A path that exists under
//! another method is reported as such so the server can answer `405` with an
//! `allow` header instead of `404`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Outcome of matching a method + path against the routing table.
pub(crate) enum Route {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path matched, but only under these methods (sorted).
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registrations return `self` so they chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and `req.param("name")` retrieves
    /// them. A static segment takes priority over a parameter at the same
    /// position, so `/api/posts/search` and `/api/posts/{id}` coexist.
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with a route already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Matches `method` + `path`.
    ///
    /// A static route registered under another method outranks a parameter
    /// match: with `GET /api/posts/search` and `PUT /api/posts/{id}`, a
    /// `PUT /api/posts/search` is a 405 allowing `GET`, not a call with
    /// `id = "search"`.
    pub(crate) fn lookup(&self, method: Method, path: &str) -> Route {
        let mut exact = Vec::new();
        let mut other = Vec::new();
        for (m, tree) in &self.routes {
            if *m == method {
                continue;
            }
            if let Ok(matched) = tree.at(path) {
                if matched.params.iter().next().is_none() {
                    exact.push(*m);
                } else {
                    other.push(*m);
                }
            }
        }

        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params: HashMap<String, String> = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            if params.is_empty() || exact.is_empty() {
                return Route::Found(Arc::clone(matched.value), params);
            }
        }

        let mut allowed = if exact.is_empty() { other } else { exact };
        if allowed.is_empty() {
            return Route::NotFound;
        }
        allowed.sort();
        Route::MethodNotAllowed(allowed)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
