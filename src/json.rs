//! JsonStore - a [`MemoryStore`] persisted to a single JSON file.
//!
//! The file holds an array of posts, pretty-printed, newest first. It is
//! rewritten in full after every successful mutation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use url::Url;

use crate::error::{Result, StoreError};
use crate::memory::MemoryStore;
use crate::post::{self, Post};
use crate::query::{Query, SortField};
use crate::registry::{url_path, Backend, Registry};
use crate::store::Store;

pub const SCHEME: &str = "json";

/// Opens a [`JsonStore`] for `json://<path>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBackend;

impl Backend for JsonBackend {
    fn open(&self, url: &Url, _registry: &Registry) -> Result<Box<dyn Store>> {
        let path = url_path(url);
        if path.is_empty() {
            return Err(StoreError::Config(format!("no file path in {url}")));
        }
        Ok(Box::new(JsonStore::open(path)?))
    }
}

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    memory: MemoryStore,
    // Held from snapshot to install; the file and memory change together.
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Load posts from `path`, creating the file with `[]` if it is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            fs::write(&path, "[]")?;
        }
        let posts = read_posts(&path)?;
        log::debug!("loaded {} posts from {}", posts.len(), path.display());

        Ok(Self {
            path,
            memory: MemoryStore::from_posts(posts),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<F>(&self, operation: &'static str, f: F) -> Result<()>
    where
        F: FnOnce(&MemoryStore) -> Result<()>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))?;
        let scratch = MemoryStore::from_posts(self.memory.find_all()?);
        f(&scratch)?;
        let posts = scratch.find_all()?;
        write_posts(&self.path, posts.clone())?;
        self.memory.replace(posts)
    }
}

fn read_posts(path: &Path) -> Result<Vec<Post>> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_posts(path: &Path, mut posts: Vec<Post>) -> Result<()> {
    post::sort_by(&mut posts, SortField::Created, true);
    let json = serde_json::to_vec_pretty(&posts)?;
    fs::write(path, json)?;
    Ok(())
}

impl Store for JsonStore {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        self.memory.find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        self.memory.find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        self.memory.find_all()
    }

    fn create(&self, post: Post) -> Result<()> {
        self.mutate("create", |memory| memory.create(post))
    }

    fn update(&self, post: Post) -> Result<()> {
        self.mutate("update", |memory| memory.update(post))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.mutate("delete", |memory| memory.delete(id))
    }

    fn close(&self) -> Result<()> {
        self.mutate("close", |_| Ok(()))
    }
}
