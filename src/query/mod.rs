//! Query - an immutable, backend-agnostic description of which posts to return.
//!
//! Queries are assembled with [`QueryBuilder`], which validates every field
//! name as it goes, or parsed from URL parameters with [`from_params`].
//! Backends can therefore trust any `Query` they receive.
//!
//! ## Example
//!
//! ```ignore
//! use gol_storage::Query;
//!
//! let q = Query::builder()
//!     .match_field("title", "rust")
//!     .sort_by("title")
//!     .reverse()
//!     .start(10)
//!     .count(5)
//!     .build()?;
//!
//! let posts = store.find(&q)?;
//! ```

mod builder;
mod params;

use std::fmt;

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::QueryError;

pub use builder::QueryBuilder;
pub use params::{from_params, to_params};

/// Fields accepted by exact-match lookups.
pub const FIND_FIELDS: &[&str] = &["id", "title", "created"];
/// Fields accepted by substring matches.
pub const MATCH_FIELDS: &[&str] = &["id", "title", "content"];
/// Fields results can be sorted by.
pub const SORT_FIELDS: &[&str] = &["title", "created"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Id,
    Title,
    Content,
    Created,
}

impl FieldName {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Id => "id",
            FieldName::Title => "title",
            FieldName::Content => "content",
            FieldName::Created => "created",
        }
    }

    /// Resolve `value` against `allowed`, reporting `op` in the error.
    pub(crate) fn parse_in(
        op: &'static str,
        value: &str,
        allowed: &'static [&'static str],
    ) -> Result<Self, QueryError> {
        let invalid = || QueryError::InvalidField {
            op,
            allowed,
            value: value.to_string(),
        };
        if !allowed.contains(&value) {
            return Err(invalid());
        }
        match value {
            "id" => Ok(FieldName::Id),
            "title" => Ok(FieldName::Title),
            "content" => Ok(FieldName::Content),
            "created" => Ok(FieldName::Created),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named value, used both for exact lookups and substring matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: FieldName,
    pub value: String,
}

impl Field {
    pub fn new(name: FieldName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    Created,
    Title,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Created => "created",
            SortField::Title => "title",
        }
    }

    pub(crate) fn parse(value: &str) -> Result<Self, QueryError> {
        match value {
            "created" => Ok(SortField::Created),
            "title" => Ok(SortField::Title),
            _ => Err(QueryError::InvalidField {
                op: "sort",
                allowed: SORT_FIELDS,
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive window on `Post::created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// What to fetch from a store.
///
/// `start`/`count` of `None` mean "from the beginning" and "everything
/// remaining". The default query returns every post, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub find: Option<Field>,
    pub start: Option<u32>,
    pub count: Option<u32>,
    pub matches: Vec<Field>,
    pub range: Option<TimeRange>,
    pub sort_by: SortField,
    pub reverse: bool,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Parse a query from the parameters of `url`.
    pub fn from_url(url: &Url) -> Result<Query, QueryError> {
        from_params(url.query_pairs())
    }

    /// True when this query asks for nothing beyond "all posts".
    pub fn is_default(&self) -> bool {
        self.find.is_none()
            && self.start.is_none()
            && self.count.is_none()
            && self.matches.is_empty()
            && self.range.is_none()
            && self.sort_by == SortField::Created
            && !self.reverse
    }
}
