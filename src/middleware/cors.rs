//! Cross-origin resource sharing.
//!
//! Browsers send a preflight `OPTIONS` before any non-simple cross-origin
//! call (a JSON `POST`, a `PUT`, a `DELETE`). The server answers every
//! preflight itself, whatever the path, and stamps
//! `access-control-allow-origin` on every other response.

use http::HeaderMap;

use crate::response::Response;
use crate::status::Status;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const DEFAULT_MAX_AGE: u32 = 3600;

#[derive(Clone, Debug, PartialEq)]
enum Origins {
    Any,
    List(Vec<String>),
}

/// CORS policy.
#[derive(Clone, Debug)]
pub struct Cors {
    origins: Origins,
    max_age: u32,
}

impl Cors {
    /// Any origin, any requested header.
    pub fn permissive() -> Self {
        Self { origins: Origins::Any, max_age: DEFAULT_MAX_AGE }
    }

    /// Parses a comma-separated origin list. A `*` entry (or an empty list)
    /// means any origin.
    ///
    /// ```rust
    /// use postboard::middleware::Cors;
    ///
    /// let cors = Cors::from_list("https://a.example, https://b.example");
    /// assert!(cors.allows("https://b.example"));
    /// assert!(!cors.allows("https://c.example"));
    /// ```
    pub fn from_list(list: &str) -> Self {
        let origins: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            return Self::permissive();
        }
        Self { origins: Origins::List(origins), max_age: DEFAULT_MAX_AGE }
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn allows(&self, origin: &str) -> bool {
        match &self.origins {
            Origins::Any => true,
            Origins::List(list) => list.iter().any(|o| o == origin),
        }
    }

    /// Value of `access-control-allow-origin` for a request carrying `origin`.
    fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        match (&self.origins, origin) {
            (Origins::Any, _) => Some("*".to_owned()),
            (Origins::List(_), Some(o)) if self.allows(o) => Some(o.to_owned()),
            (Origins::List(_), _) => None,
        }
    }

    /// Answers an `OPTIONS` preflight with `204 No Content`.
    pub(crate) fn preflight(&self, headers: &HeaderMap) -> Response {
        let requested = headers
            .get(http::header::ACCESS_CONTROL_REQUEST_HEADERS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("*");

        let mut res = Response::builder()
            .status(Status::NoContent)
            .header("access-control-allow-methods", ALLOW_METHODS)
            .header("access-control-allow-headers", requested)
            .header("access-control-max-age", &self.max_age.to_string())
            .no_body();
        self.apply(origin(headers), &mut res);
        res
    }

    /// Stamps the allow-origin header on `res` when the origin is permitted.
    pub(crate) fn apply(&self, origin: Option<&str>, res: &mut Response) {
        let Some(value) = self.allow_origin(origin) else { return };
        if matches!(self.origins, Origins::List(_)) {
            res.set_header("vary", "origin");
        }
        res.set_header("access-control-allow-origin", value);
    }
}

impl Default for Cors {
    fn default() -> Self { Self::permissive() }
}

pub(crate) fn origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(http::header::ORIGIN).and_then(|v| v.to_str().ok())
}
