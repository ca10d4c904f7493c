use std::fmt;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Why a post operation was rejected.
///
/// Every variant leaves the collection untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostError {
    /// Client input violates a documented constraint (400).
    InvalidArgument(String),
    /// The referenced id has no post (404).
    NotFound(String),
}

impl PostError {
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidArgument(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
        }
    }
}

impl fmt::Display for PostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) | Self::NotFound(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for PostError {}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        Response::error(self.status(), self.to_string())
    }
}
