use thiserror::Error;

/// Errors raised while building or parsing a [`Query`](crate::Query).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{op} must be one of {allowed:?} but was {value:?}")]
    InvalidField {
        op: &'static str,
        allowed: &'static [&'static str],
        value: String,
    },
    #[error("empty range")]
    EmptyRange,
    #[error("invalid {name} value: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("match must be of the format field:match, but was '{0}'")]
    MalformedMatch(String),
    #[error("range must be of the format `start,end`, but was '{0}'")]
    MalformedRange(String),
    #[error("invalid {what}: {value:?} is not an RFC 3339 timestamp")]
    InvalidTimestamp { what: &'static str, value: String },
}

/// Errors returned by [`Store`](crate::Store) implementations and the backend registry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("post already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
    #[error("store is closed")]
    Closed,
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[cfg(feature = "remote")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response code: {status} ({reason})")]
    UnexpectedStatus { status: u16, reason: String },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("no such backend: {0}")]
    NoSuchBackend(String),
    #[error("duplicate backend: {0}")]
    DuplicateBackend(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True for errors reporting a missing post.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
