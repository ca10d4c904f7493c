//! HTTP handlers for `/api/posts`.
//!
//! Each handler validates its inputs completely before touching the store,
//! so a rejected request never mutates the collection.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use super::error::PostError;
use super::model::{NewPost, Post, PostSummary, PostUpdate, SearchQuery, SortOrder};
use super::store::PostStore;
use crate::{Json, Request, Status};

/// `GET /api/posts?sort=&direction=`
pub async fn list_posts(store: Arc<PostStore>, req: Request) -> Result<Json<Vec<Post>>, PostError> {
    let order = SortOrder::parse(req.query("sort"), req.query("direction")).inspect_err(|e| {
        debug!(error = %e, "rejected list query");
    })?;
    Ok(Json(store.list(order)))
}

/// `POST /api/posts`
pub async fn create_post(store: Arc<PostStore>, req: Request) -> Result<(Status, Json<Post>), PostError> {
    let new = NewPost::from_payload(json_object(&req)?).inspect_err(|e| {
        debug!(error = %e, "rejected create payload");
    })?;
    Ok((Status::Created, Json(store.create(new))))
}

/// `DELETE /api/posts/{id}`
pub async fn delete_post(store: Arc<PostStore>, req: Request) -> Result<Json<Value>, PostError> {
    let id = path_id(&req)?;
    store.delete(id)?;
    Ok(Json(json!({ "message": format!("Post with id {id} has been deleted successfully.") })))
}

/// `PUT /api/posts/{id}`
///
/// A malformed body is rejected (400) before the id is looked up (404).
pub async fn update_post(store: Arc<PostStore>, req: Request) -> Result<Json<PostSummary>, PostError> {
    let id = path_id(&req)?;
    let update = PostUpdate::from_payload(json_object(&req)?)?;
    Ok(Json(store.update(id, update)?.into()))
}

/// `GET /api/posts/search?title=&content=`
pub async fn search_posts(store: Arc<PostStore>, req: Request) -> Json<Vec<Post>> {
    let query = SearchQuery::new(
        req.query("title").unwrap_or_default(),
        req.query("content").unwrap_or_default(),
    );
    Json(store.search(&query))
}

/// Only plain digit runs are ids. Anything else (`abc`, `-1`, `+1`) matches no
/// post, as if the route itself had not matched.
fn path_id(req: &Request) -> Result<u64, PostError> {
    req.param("id")
        .filter(|raw| !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| PostError::NotFound("Not found".to_owned()))
}

fn json_object(req: &Request) -> Result<Map<String, Value>, PostError> {
    match req.json::<Value>() {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(PostError::InvalidArgument("Request body must be a JSON object.".to_owned())),
        Err(e) => Err(PostError::InvalidArgument(format!("Invalid JSON body: {e}"))),
    }
}
