//! MultiStore - one primary store mirrored to any number of secondaries.
//!
//! Reads go to the primary only. Writes go to the primary on the calling
//! thread, and its result is the result of the call. Every secondary gets
//! the same write on its own detached thread: failures are logged and
//! dropped, never retried, and never seen by the caller.
//!
//! ```text
//! multi://?primary=<url-encoded url>&secondary=<url-encoded url>[&secondary=...]
//! ```

use std::sync::Arc;
use std::thread;

use url::Url;

use crate::error::{Result, StoreError};
use crate::post::Post;
use crate::query::Query;
use crate::registry::{Backend, Registry};
use crate::store::Store;

pub const SCHEME: &str = "multi";

/// Opens a [`MultiStore`], opening each wrapped store through the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiBackend;

impl Backend for MultiBackend {
    fn open(&self, url: &Url, registry: &Registry) -> Result<Box<dyn Store>> {
        let mut primary_url = None;
        let mut secondary_urls = Vec::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "primary" if primary_url.is_none() => primary_url = Some(value.into_owned()),
                "secondary" => secondary_urls.push(value.into_owned()),
                _ => {}
            }
        }

        let primary_url = primary_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StoreError::Config("no primary store specified".into()))?;
        let primary = registry.open(&primary_url).map_err(|e| {
            StoreError::Config(format!("error opening primary store '{primary_url}': {e}"))
        })?;

        let mut secondaries: Vec<(String, Arc<dyn Store>)> =
            Vec::with_capacity(secondary_urls.len());
        for secondary_url in secondary_urls {
            let secondary = registry.open(&secondary_url).map_err(|e| {
                StoreError::Config(format!(
                    "error opening secondary store '{secondary_url}': {e}"
                ))
            })?;
            secondaries.push((secondary_url, Arc::from(secondary)));
        }

        log::info!(
            "multi store: primary {} with {} secondaries",
            primary_url,
            secondaries.len()
        );
        Ok(Box::new(MultiStore::new(primary, secondaries)))
    }
}

pub struct MultiStore {
    primary: Box<dyn Store>,
    secondaries: Vec<(String, Arc<dyn Store>)>,
}

impl MultiStore {
    /// Wrap `primary` and `secondaries`; each secondary is labelled (usually
    /// with its URL) for log messages.
    pub fn new(primary: Box<dyn Store>, secondaries: Vec<(String, Arc<dyn Store>)>) -> Self {
        Self {
            primary,
            secondaries,
        }
    }

    pub fn secondary_names(&self) -> Vec<&str> {
        self.secondaries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Run `write` against every secondary on its own thread, without waiting.
    fn replicate<F>(&self, operation: &'static str, write: F)
    where
        F: Fn(&dyn Store) -> Result<()> + Clone + Send + 'static,
    {
        for (name, secondary) in &self.secondaries {
            let name = name.clone();
            let secondary = Arc::clone(secondary);
            let write = write.clone();
            let spawned = thread::Builder::new()
                .name(format!("multi-{operation}"))
                .spawn(move || {
                    if let Err(err) = write(secondary.as_ref()) {
                        log::error!("[{name}] {operation}: {err}");
                    }
                });
            if let Err(err) = spawned {
                log::error!("could not start {operation} for secondary: {err}");
            }
        }
    }
}

impl Store for MultiStore {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        self.primary.find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        self.primary.find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        self.primary.find_all()
    }

    fn create(&self, post: Post) -> Result<()> {
        let copy = post.clone();
        self.replicate("create", move |s| s.create(copy.clone()));
        self.primary.create(post)
    }

    fn update(&self, post: Post) -> Result<()> {
        let copy = post.clone();
        self.replicate("update", move |s| s.update(copy.clone()));
        self.primary.update(post)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let id_copy = id.to_string();
        self.replicate("delete", move |s| s.delete(&id_copy));
        self.primary.delete(id)
    }

    /// Close every secondary (logging failures), then the primary.
    fn close(&self) -> Result<()> {
        for (name, secondary) in &self.secondaries {
            if let Err(err) = secondary.close() {
                log::error!("[{name}] close: {err}");
            }
        }
        self.primary.close()
    }
}
