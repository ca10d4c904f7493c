//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C (or when the future given to
//! [`Server::serve_with_shutdown`] resolves) the server:
//! 1. Stops `listener.accept()` at once, so no new connections are made.
//! 2. Tells every open connection to shut down gracefully: a request in
//!    flight still gets its response, an idle keep-alive connection closes.
//! 3. Returns from `serve` once every connection task has ended.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info};

use crate::error::Error;
use crate::method::Method;
use crate::middleware::{cors, trace, Cors};
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};
use crate::status::Status;

enum Listener {
    Addr(SocketAddr),
    Bound(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listener: Listener,
    cors: Option<Cors>,
}

/// Everything a connection task needs, shared behind one `Arc`.
struct App {
    router: Router,
    cors: Option<Cors>,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use postboard::Server;
    /// let server = Server::bind(([0, 0, 0, 0], 5002).into());
    /// ```
    pub fn bind(addr: SocketAddr) -> Self {
        Self { listener: Listener::Addr(addr), cors: None }
    }

    /// Serves on an already-bound listener (e.g. one bound to port 0).
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listener: Listener::Bound(listener), cors: None }
    }

    /// Applies `cors` to every response and answers preflights with it.
    pub fn cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    /// The address the server listens (or will listen) on.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        match &self.listener {
            Listener::Addr(addr) => Ok(*addr),
            Listener::Bound(listener) => Ok(listener.local_addr()?),
        }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but shuts down when `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = match self.listener {
            Listener::Addr(addr) => TcpListener::bind(addr).await?,
            Listener::Bound(listener) => listener,
        };
        let app = Arc::new(App { router, cors: self.cors });

        info!(addr = %listener.local_addr()?, "postboard listening");

        let mut tasks = tokio::task::JoinSet::new();
        let (stop_tx, stop_rx) = watch::channel(());

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Checked first so a shutdown stops accepting even while
                // connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);
                    let mut stop = stop_rx.clone();

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req).await }
                        });

                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        let res = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = stop.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(e) = res {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Idle connections close now; busy ones after their current response.
        stop_tx.send_replace(());
        while tasks.join_next().await.is_some() {}

        info!("postboard stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Every failure becomes a JSON error response, so hyper never sees an error.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let span = trace::span(&parts.method, parts.uri.path());
    let origin = cors::origin(&parts.headers).map(str::to_owned);

    async move {
        let mut response = route(&app, parts, body).await;
        if let Some(cors) = &app.cors {
            cors.apply(origin.as_deref(), &mut response);
        }
        trace::completed(response.status_code(), started);
        Ok(response.into_inner())
    }
    .instrument(span)
    .await
}

async fn route(app: &App, parts: http::request::Parts, body: Incoming) -> Response {
    let Ok(method) = Method::try_from(&parts.method) else {
        return Response::error(Status::MethodNotAllowed, "Method not allowed");
    };

    if method == Method::Options {
        if let Some(cors) = &app.cors {
            return cors.preflight(&parts.headers);
        }
    }

    match app.router.lookup(method, parts.uri.path()) {
        Route::Found(handler, params) => {
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    debug!("failed to read request body: {e}");
                    return Response::error(Status::BadRequest, "Failed to read request body");
                }
            };
            handler(Request::new(&parts.uri, body, params)).await
        }
        Route::MethodNotAllowed(allowed) => {
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            let mut res = Response::error(Status::MethodNotAllowed, "Method not allowed");
            res.set_header("allow", allow);
            res
        }
        Route::NotFound => Response::error(Status::NotFound, "Not found"),
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both SIGTERM and SIGINT (Ctrl-C). On Windows
/// only Ctrl-C is available. A handler that cannot be installed disables its
/// arm rather than shutting the server down.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
