//! Per-request tracing.

use std::time::Instant;

use tracing::{Span, info, info_span};

use crate::status::Status;

/// Span wrapping one request, from routing to the last response byte handed
/// to hyper.
pub(crate) fn span(method: &http::Method, path: &str) -> Span {
    info_span!("request", %method, path)
}

pub(crate) fn completed(status: Status, started: Instant) {
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(status = u16::from(status), latency_ms, "request completed");
}
