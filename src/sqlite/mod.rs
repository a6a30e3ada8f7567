//! SqliteStore - posts in a single SQLite table.
//!
//! ```text
//! posts(id TEXT NOT NULL PRIMARY KEY, created DATETIME, title TEXT, content TEXT)
//! ```
//!
//! Queries are translated to SQL (see [`query`]); mutations run in a
//! transaction and are committed before the call returns.

mod query;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use url::Url;

use crate::error::{Result, StoreError};
use crate::post::Post;
use crate::query::Query;
use crate::registry::{url_path, Backend, Registry};
use crate::store::Store;

use self::query::{build_sql_query, format_created, COLUMNS};

pub const SCHEME: &str = "sqlite";

/// Opens a [`SqliteStore`] for `sqlite://<path>`; no path means a private
/// in-memory database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    fn open(&self, url: &Url, _registry: &Registry) -> Result<Box<dyn Store>> {
        let path = url_path(url);
        let store = if path.is_empty() {
            SqliteStore::open_in_memory()?
        } else {
            SqliteStore::open(path)?
        };
        Ok(Box::new(store))
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::setup(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::setup(Connection::open_in_memory()?)
    }

    fn setup(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id TEXT NOT NULL PRIMARY KEY,
                created DATETIME,
                title TEXT,
                content TEXT
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut guard: MutexGuard<'_, Option<Connection>> = self
            .conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))?;
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        f(conn)
    }
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    let created: String = row.get(1)?;
    let created = DateTime::parse_from_rfc3339(&created)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(Post {
        id: row.get(0)?,
        created,
        title: row.get(2)?,
        content: row.get(3)?,
    })
}

fn select_by_id(conn: &Connection, id: &str) -> Result<Option<Post>> {
    let sql = format!("SELECT {COLUMNS} FROM posts WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_post).optional()?)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

impl Store for SqliteStore {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        let sql_query = build_sql_query(query)?;
        log::debug!("sqlite find: {}", sql_query.sql);
        self.with_conn("find", |conn| {
            let mut stmt = conn.prepare(&sql_query.sql)?;
            let posts = stmt
                .query_map(params_from_iter(sql_query.params.iter()), row_to_post)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(posts)
        })
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        self.with_conn("find_by_id", |conn| {
            select_by_id(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        self.find(&Query::default())
    }

    fn create(&self, post: Post) -> Result<()> {
        self.with_conn("create", |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO posts (id, created, title, content) VALUES (?1, ?2, ?3, ?4)",
                params![post.id, format_created(&post.created), post.title, post.content],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::AlreadyExists(post.id.clone())
                } else {
                    StoreError::from(e)
                }
            })?;
            tx.commit()?;
            Ok(())
        })
    }

    fn update(&self, post: Post) -> Result<()> {
        self.with_conn("update", |conn| {
            let tx = conn.transaction()?;
            let mut stored =
                select_by_id(&tx, &post.id)?.ok_or_else(|| StoreError::NotFound(post.id.clone()))?;
            stored.merge(&post);
            tx.execute(
                "UPDATE posts SET title = ?1, content = ?2 WHERE id = ?3",
                params![stored.title, stored.content, stored.id],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.with_conn("delete", |conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned("close"))?;
        match guard.take() {
            Some(conn) => conn.close().map_err(|(_, e)| StoreError::from(e)),
            None => Ok(()),
        }
    }
}
