//! Post storage for the gol blog.
//!
//! Every backend implements the same [`Store`] contract and is picked at
//! runtime from a connection URL through a [`Registry`]:
//!
//! ```ignore
//! use gol_storage::{Post, Query, Registry, Store};
//!
//! let registry = Registry::with_defaults();
//! let store = registry.open("json://./posts.json")?;
//!
//! store.create(Post::new("hello", "first post!"))?;
//! let latest = store.find(&Query::builder().reverse().count(10).build()?)?;
//! ```

mod config;
mod error;
mod post;
mod registry;
mod store;

pub mod json;
pub mod memory;
pub mod multi;
pub mod query;
#[cfg(feature = "remote")]
pub mod remote;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{StorageConfig, DEFAULT_STORAGE, STORAGE_ENV};
pub use error::{QueryError, Result, StoreError};
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use multi::MultiStore;
pub use post::{by_created, by_title, sort_by, Post};
pub use query::{Field, FieldName, Query, QueryBuilder, SortField, TimeRange};
pub use registry::{Backend, Registry};
#[cfg(feature = "remote")]
pub use remote::RemoteStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use store::Store;
