//! The shared post collection.

use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::error::PostError;
use super::model::{NewPost, Post, PostUpdate, SearchQuery, SortDirection, SortOrder};

/// The process-wide, ordered post collection.
///
/// One mutex guards the whole sequence and each operation holds it for its
/// full read-modify-write, so id assignment and append, or lookup and
/// removal, can never interleave with another request.
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Mutex<Vec<Post>>,
}

impl PostStore {
    /// An empty store. The first post created gets id 1.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self { posts: Mutex::new(posts) }
    }

    /// The two posts the service starts with.
    pub fn seeded() -> Self {
        Self::with_posts(vec![
            Post::new(1, "First post", "This is the first post."),
            Post::new(2, "Second post", "This is the second post."),
        ])
    }

    // No operation panics while holding the guard, so a poisoned lock still
    // guards a consistent collection.
    fn lock(&self) -> MutexGuard<'_, Vec<Post>> {
        self.posts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns every post, after sorting the stored collection by `order`
    /// when given.
    ///
    /// The sort is stable and persists: later unsorted listings return the
    /// sorted order.
    pub fn list(&self, order: Option<SortOrder>) -> Vec<Post> {
        let mut posts = self.lock();
        if let Some(SortOrder { field, direction }) = order {
            match direction {
                SortDirection::Asc => posts.sort_by_cached_key(|p| field.key(p)),
                SortDirection::Desc => posts.sort_by_cached_key(|p| Reverse(field.key(p))),
            }
            debug!(sort = %field, %direction, "sorted posts");
        }
        posts.clone()
    }

    /// Appends a post with id `max + 1` (1 when empty) and returns it.
    pub fn create(&self, new: NewPost) -> Post {
        let mut posts = self.lock();
        let id = posts.iter().map(|p| p.id).max().map_or(1, |max| max + 1);
        let post = Post { id, title: new.title, content: new.content, extra: new.extra };
        posts.push(post.clone());
        info!(id, "post created");
        post
    }

    /// Removes the post with `id`, keeping the others in order.
    pub fn delete(&self, id: u64) -> Result<(), PostError> {
        let mut posts = self.lock();
        let Some(index) = posts.iter().position(|p| p.id == id) else {
            debug!(id, "delete of unknown post");
            return Err(PostError::NotFound(format!("Post with id {id} is not found.")));
        };
        posts.remove(index);
        info!(id, "post deleted");
        Ok(())
    }

    /// Overwrites the given fields of post `id` and returns the result.
    pub fn update(&self, id: u64, update: PostUpdate) -> Result<Post, PostError> {
        let mut posts = self.lock();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            debug!(id, "update of unknown post");
            return Err(PostError::NotFound(format!("Post with id {id} not found.")));
        };
        if let Some(title) = update.title {
            post.title = title;
        }
        if let Some(content) = update.content {
            post.content = content;
        }
        info!(id, "post updated");
        Ok(post.clone())
    }

    /// Matching posts in stored order.
    pub fn search(&self, query: &SearchQuery) -> Vec<Post> {
        let matches: Vec<Post> = self.lock().iter().filter(|p| query.matches(p)).cloned().collect();
        debug!(matches = matches.len(), "searched posts");
        matches
    }
}
