//! Translation of a [`Query`] into a parameterised SELECT over `posts`.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;

use crate::error::{QueryError, Result};
use crate::query::{FieldName, Query};

pub(crate) const COLUMNS: &str = "id, created, title, content";

/// A SELECT statement and the values bound to its `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Stored form of `created`: fixed-width UTC text, so comparing the text
/// compares the instants.
pub(crate) fn format_created(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn column(name: FieldName) -> &'static str {
    name.as_str()
}

pub(crate) fn build_sql_query(q: &Query) -> Result<SqlQuery> {
    let mut sql = format!("SELECT {COLUMNS} FROM posts");
    let mut params = Vec::new();

    if let Some(find) = &q.find {
        let value = match find.name {
            FieldName::Created => {
                let at = DateTime::parse_from_rfc3339(&find.value).map_err(|_| {
                    QueryError::InvalidTimestamp {
                        what: "created",
                        value: find.value.clone(),
                    }
                })?;
                format_created(&at.with_timezone(&Utc))
            }
            _ => find.value.clone(),
        };
        sql.push_str(&format!(" WHERE {} = ? ORDER BY rowid LIMIT 1", column(find.name)));
        params.push(Value::Text(value));
        return Ok(SqlQuery { sql, params });
    }

    if q.is_default() {
        sql.push_str(" ORDER BY rowid");
        return Ok(SqlQuery { sql, params });
    }

    let mut clauses = Vec::new();
    for m in &q.matches {
        clauses.push(format!("instr({}, ?) > 0", column(m.name)));
        params.push(Value::Text(m.value.clone()));
    }
    if let Some(range) = &q.range {
        clauses.push("created >= ? AND created <= ?".to_string());
        params.push(Value::Text(format_created(&range.start)));
        params.push(Value::Text(format_created(&range.end)));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let order = if q.reverse { "DESC" } else { "ASC" };
    // rowid breaks ties in insertion order, as the in-memory engine does.
    sql.push_str(&format!(" ORDER BY {} {order}, rowid", q.sort_by.as_str()));

    if q.start.is_some() || q.count.is_some() {
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(q.count.map_or(-1, i64::from)));
        params.push(Value::Integer(q.start.map_or(0, i64::from)));
    }

    Ok(SqlQuery { sql, params })
}
