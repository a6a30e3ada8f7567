//! MemoryStore - Vec-backed store, and the reference query engine.
//!
//! Records are kept in insertion order. Queries never reorder the stored
//! records; sorting happens on a copy.

mod query;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use url::Url;

use crate::error::{Result, StoreError};
use crate::post::Post;
use crate::query::Query;
use crate::registry::{Backend, Registry};
use crate::store::Store;

pub use query::run_query;

pub const SCHEME: &str = "memory";

/// Opens an empty [`MemoryStore`] for `memory://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    fn open(&self, _url: &Url, _registry: &Registry) -> Result<Box<dyn Store>> {
        Ok(Box::new(MemoryStore::new()))
    }
}

/// In-memory store. Clone-friendly via Arc: clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    posts: Arc<RwLock<Vec<Post>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `posts`, kept in the given order.
    pub fn from_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Arc::new(RwLock::new(posts)),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read("is_empty")?.is_empty())
    }

    /// Swap in `posts` wholesale, in the given order.
    pub(crate) fn replace(&self, posts: Vec<Post>) -> Result<()> {
        *self.write("replace")? = posts;
        Ok(())
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Vec<Post>>> {
        self.posts
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Vec<Post>>> {
        self.posts
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }
}

impl Store for MemoryStore {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        let posts = self.read("find")?;
        run_query(&posts, query)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        let posts = self.read("find_by_id")?;
        posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        Ok(self.read("find_all")?.clone())
    }

    fn create(&self, post: Post) -> Result<()> {
        let mut posts = self.write("create")?;
        if posts.iter().any(|p| p.id == post.id) {
            return Err(StoreError::AlreadyExists(post.id));
        }
        posts.push(post);
        Ok(())
    }

    fn update(&self, post: Post) -> Result<()> {
        let mut posts = self.write("update")?;
        let stored = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| StoreError::NotFound(post.id.clone()))?;
        stored.merge(&post);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut posts = self.write("delete")?;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
