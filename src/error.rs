//! Unified infrastructure error type.

use std::fmt;

/// The error type returned by postboard's fallible infrastructure operations.
///
/// Rejected client input (bad sort field, unknown id, ...) never surfaces
/// here. Those are [`PostError`](crate::posts::PostError)s and become HTTP
/// responses. This type covers binding to a port, accepting connections and
/// reading configuration.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
