//! Middleware layer.
//!
//! Cross-cutting concerns applied by the server around every handler call:
//!
//! - [`cors`]: `access-control-*` headers and `OPTIONS` preflight answers
//! - `trace`: per-request span with method and path, one completion event
//!   with status and latency

pub mod cors;
pub(crate) mod trace;

pub use cors::Cors;
