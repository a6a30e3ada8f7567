//! StorageConfig - which store(s) to open.
//!
//! A comma-separated list of connection URLs: the first is the primary,
//! any further ones are mirrored secondaries behind a `multi://` store.

use std::env;

use url::form_urlencoded;

use crate::error::{Result, StoreError};
use crate::registry::Registry;
use crate::store::Store;

pub const STORAGE_ENV: &str = "GOL_STORAGE";
pub const DEFAULT_STORAGE: &str = "json://posts.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    urls: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_STORAGE.to_string()],
        }
    }
}

impl StorageConfig {
    pub fn new(urls: Vec<String>) -> Result<Self> {
        if urls.is_empty() || urls.iter().any(|u| u.is_empty()) {
            return Err(StoreError::Config("empty storage url".into()));
        }
        Ok(Self { urls })
    }

    /// Parse `a,b,c`.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::new(raw.split(',').map(|u| u.trim().to_string()).collect())
    }

    /// Read `GOL_STORAGE`, falling back to `json://posts.json`.
    pub fn from_env() -> Result<Self> {
        match env::var(STORAGE_ENV) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// The single URL to hand to [`Registry::open`].
    pub fn connection_url(&self) -> String {
        match self.urls.as_slice() {
            [single] => single.clone(),
            [primary, secondaries @ ..] => {
                let mut query = form_urlencoded::Serializer::new(String::new());
                query.append_pair("primary", primary);
                for secondary in secondaries {
                    query.append_pair("secondary", secondary);
                }
                format!("{}://?{}", crate::multi::SCHEME, query.finish())
            }
            [] => DEFAULT_STORAGE.to_string(),
        }
    }

    pub fn open(&self, registry: &Registry) -> Result<Box<dyn Store>> {
        registry.open(&self.connection_url())
    }
}
