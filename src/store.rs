//! Store - the operation set every backend implements.

use std::sync::Arc;

use crate::error::Result;
use crate::post::Post;
use crate::query::Query;

/// Persistent collection of posts.
///
/// Every call may block on I/O. Implementations serialize access to their
/// own records, so a store can be shared between threads.
pub trait Store: Send + Sync {
    /// Run `query`. An exact lookup that hits nothing is an empty result,
    /// not an error.
    fn find(&self, query: &Query) -> Result<Vec<Post>>;

    /// Fetch one post. A missing id is [`StoreError::NotFound`](crate::StoreError::NotFound).
    fn find_by_id(&self, id: &str) -> Result<Post>;

    fn find_all(&self) -> Result<Vec<Post>>;

    fn create(&self, post: Post) -> Result<()>;

    /// Partial update keyed by `post.id`: empty `title`/`content` are left unchanged.
    fn update(&self, post: Post) -> Result<()>;

    fn delete(&self, id: &str) -> Result<()>;

    /// Release resources held by the store.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        (**self).find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        (**self).find_all()
    }

    fn create(&self, post: Post) -> Result<()> {
        (**self).create(post)
    }

    fn update(&self, post: Post) -> Result<()> {
        (**self).update(post)
    }

    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        (**self).find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        (**self).find_all()
    }

    fn create(&self, post: Post) -> Result<()> {
        (**self).create(post)
    }

    fn update(&self, post: Post) -> Result<()> {
        (**self).update(post)
    }

    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}
