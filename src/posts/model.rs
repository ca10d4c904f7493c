//! Post record and the validated inputs of each operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::PostError;

/// The single domain record.
///
/// Fields beyond `id`, `title` and `content` supplied at creation are kept in
/// `extra` and serialized alongside the typed ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn new(id: u64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id, title: title.into(), content: content.into(), extra: Map::new() }
    }
}

/// The `{id, title, content}` projection returned by an update.
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub content: String,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self { id: post.id, title: post.title, content: post.content }
    }
}

// ── Create ────────────────────────────────────────────────────────────────────

/// A validated create payload, not yet assigned an id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub extra: Map<String, Value>,
}

impl NewPost {
    /// Validates a create payload.
    ///
    /// Every missing required field is reported at once, in the order
    /// `title`, `content`. A client-supplied `id` is dropped.
    pub fn from_payload(mut payload: Map<String, Value>) -> Result<Self, PostError> {
        let title = payload.remove("title");
        let content = payload.remove("content");

        let missing: Vec<&str> = [("title", title.is_none()), ("content", content.is_none())]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
        if !missing.is_empty() {
            return Err(PostError::InvalidArgument(format!(
                "Missing fields: {}",
                missing.join(", ")
            )));
        }

        let title = text_field("title", title)?;
        let content = text_field("content", content)?;
        payload.remove("id");

        Ok(Self { title, content, extra: payload })
    }
}

// ── Update ────────────────────────────────────────────────────────────────────

/// A partial update: `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostUpdate {
    /// Picks `title` and `content` out of an update payload. Everything else,
    /// `id` included, is ignored.
    pub fn from_payload(mut payload: Map<String, Value>) -> Result<Self, PostError> {
        let title = payload.remove("title").map(|v| text_field("title", Some(v))).transpose()?;
        let content = payload.remove("content").map(|v| text_field("content", Some(v))).transpose()?;
        Ok(Self { title, content })
    }
}

fn text_field(name: &str, value: Option<Value>) -> Result<String, PostError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(PostError::InvalidArgument(format!("Field '{name}' must be a string."))),
    }
}

// ── List ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortField {
    Title,
    Content,
}

impl SortField {
    pub(crate) fn key(self, post: &Post) -> String {
        match self {
            Self::Title => post.title.to_lowercase(),
            Self::Content => post.content.to_lowercase(),
        }
    }
}

impl FromStr for SortField {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            _ => Err(PostError::InvalidArgument(
                "Invalid sort field. Use 'title' or 'content'.".to_owned(),
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Content => "content",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(PostError::InvalidArgument(
                "Invalid sort direction. Use 'asc' or 'desc'.".to_owned(),
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Validates the raw `sort` / `direction` query values.
    ///
    /// The field is checked before the direction and both are checked even
    /// when no sort will happen. Empty values count as absent. A direction
    /// without a field is accepted and yields `None`.
    pub fn parse(sort: Option<&str>, direction: Option<&str>) -> Result<Option<Self>, PostError> {
        let field = sort
            .filter(|s| !s.is_empty())
            .map(SortField::from_str)
            .transpose()?;
        let direction = direction
            .filter(|d| !d.is_empty())
            .map(SortDirection::from_str)
            .transpose()?
            .unwrap_or_default();
        Ok(field.map(|field| Self { field, direction }))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Case-insensitive substring filters; an empty filter matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    title: String,
    content: String,
}

impl SearchQuery {
    pub fn new(title: &str, content: &str) -> Self {
        Self { title: title.to_lowercase(), content: content.to_lowercase() }
    }

    pub fn matches(&self, post: &Post) -> bool {
        (self.title.is_empty() || post.title.to_lowercase().contains(&self.title))
            && (self.content.is_empty() || post.content.to_lowercase().contains(&self.content))
    }
}
