//! QueryBuilder - fluent, validating construction of a [`Query`].

use chrono::{DateTime, Utc};

use super::{Field, FieldName, Query, SortField, TimeRange, FIND_FIELDS, MATCH_FIELDS};
use crate::error::QueryError;

/// Builds a [`Query`] one call at a time.
///
/// The first invalid call poisons the builder: every later call is ignored
/// and [`build`](QueryBuilder::build) returns that first error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryBuilder {
    Valid(Query),
    Invalid(QueryError),
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::Valid(Query::default())
    }

    fn apply<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut Query) -> Result<(), QueryError>,
    {
        match self {
            QueryBuilder::Valid(mut query) => match f(&mut query) {
                Ok(()) => QueryBuilder::Valid(query),
                Err(err) => QueryBuilder::Invalid(err),
            },
            invalid => invalid,
        }
    }

    /// Exact match on `field` (one of `id`, `title`, `created`).
    ///
    /// `created` values must be RFC 3339 timestamps.
    pub fn find(self, field: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        self.apply(|q| {
            let name = FieldName::parse_in("by", field, FIND_FIELDS)?;
            if name == FieldName::Created && DateTime::parse_from_rfc3339(&value).is_err() {
                return Err(QueryError::InvalidTimestamp {
                    what: "created",
                    value,
                });
            }
            q.find = Some(Field::new(name, value));
            Ok(())
        })
    }

    pub fn start(self, pos: u32) -> Self {
        self.apply(|q| {
            q.start = Some(pos);
            Ok(())
        })
    }

    pub fn count(self, count: u32) -> Self {
        self.apply(|q| {
            q.count = Some(count);
            Ok(())
        })
    }

    /// Substring match on `field` (one of `id`, `title`, `content`).
    /// Repeated calls are AND-combined.
    pub fn match_field(self, field: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        self.apply(|q| {
            let name = FieldName::parse_in("match", field, MATCH_FIELDS)?;
            q.matches.push(Field::new(name, value));
            Ok(())
        })
    }

    /// Restrict to posts created within `[start, end]`.
    ///
    /// Bounds falling in the same second are an empty range.
    pub fn range(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.apply(|q| {
            if start.timestamp() == end.timestamp() {
                return Err(QueryError::EmptyRange);
            }
            q.range = Some(TimeRange { start, end });
            Ok(())
        })
    }

    pub fn sort_by(self, field: &str) -> Self {
        self.apply(|q| {
            q.sort_by = SortField::parse(field)?;
            Ok(())
        })
    }

    /// Toggle descending order; calling twice cancels out.
    pub fn reverse(self) -> Self {
        self.apply(|q| {
            q.reverse = !q.reverse;
            Ok(())
        })
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, QueryBuilder::Valid(_))
    }

    pub fn build(self) -> Result<Query, QueryError> {
        match self {
            QueryBuilder::Valid(query) => Ok(query),
            QueryBuilder::Invalid(err) => Err(err),
        }
    }
}
