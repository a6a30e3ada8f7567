//! Registry - selects and opens a backend from a connection URL.
//!
//! The URL scheme names the backend, the rest of the URL configures it:
//!
//! ```text
//! memory://
//! json://./posts.json
//! sqlite:///var/lib/gol/posts.db
//! gol://localhost:5000
//! multi://?primary=<url-encoded url>&secondary=<url-encoded url>
//! ```
//!
//! Build one registry at startup, register every backend, then share it
//! read-only with whatever opens stores.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Opens a [`Store`] from a parsed connection URL.
///
/// `registry` is handed through so composite backends can open the stores
/// they wrap.
pub trait Backend: Send + Sync {
    fn open(&self, url: &Url, registry: &Registry) -> Result<Box<dyn Store>>;
}

impl<F> Backend for F
where
    F: Fn(&Url, &Registry) -> Result<Box<dyn Store>> + Send + Sync,
{
    fn open(&self, url: &Url, registry: &Registry) -> Result<Box<dyn Store>> {
        self(url, registry)
    }
}

#[derive(Default, Clone)]
pub struct Registry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("Registry").field("backends", &names).finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every backend compiled into this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::memory::SCHEME, crate::memory::MemoryBackend);
        registry.register(crate::json::SCHEME, crate::json::JsonBackend);
        #[cfg(feature = "sqlite")]
        registry.register(crate::sqlite::SCHEME, crate::sqlite::SqliteBackend);
        #[cfg(feature = "remote")]
        registry.register(crate::remote::SCHEME, crate::remote::RemoteBackend);
        registry.register(crate::multi::SCHEME, crate::multi::MultiBackend);
        registry
    }

    /// Register `backend` under `name`, rejecting a name already taken.
    pub fn try_register(&mut self, name: &str, backend: impl Backend + 'static) -> Result<()> {
        if self.backends.contains_key(name) {
            return Err(StoreError::DuplicateBackend(name.to_string()));
        }
        self.backends.insert(name.to_string(), Arc::new(backend));
        Ok(())
    }

    /// Register `backend` under `name`.
    ///
    /// # Panics
    ///
    /// Panics when `name` is already registered. Two backends claiming one
    /// scheme is a startup misconfiguration.
    pub fn register(&mut self, name: &str, backend: impl Backend + 'static) {
        if let Err(err) = self.try_register(name, backend) {
            panic!("{err}");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    /// Parse `raw_url` and open it with the backend registered for its scheme.
    pub fn open(&self, raw_url: &str) -> Result<Box<dyn Store>> {
        let url = Url::parse(raw_url)?;
        self.open_url(&url)
    }

    pub fn open_url(&self, url: &Url) -> Result<Box<dyn Store>> {
        let backend = self
            .backends
            .get(url.scheme())
            .ok_or_else(|| StoreError::NoSuchBackend(url.scheme().to_string()))?;
        log::debug!("opening {} store at {}", url.scheme(), url);
        backend.open(url, self)
    }
}

/// Filesystem path named by a `scheme://host/path` URL: host and path glued back together.
pub(crate) fn url_path(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or(""), url.path())
}
