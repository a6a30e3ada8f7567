use chrono::{DateTime, Utc};

use crate::error::{QueryError, Result};
use crate::post::{self, Post};
use crate::query::{Field, FieldName, Query};

/// Execute `query` against `posts`.
///
/// - `find` on `id`: direct lookup, empty on a miss.
/// - the default query: every post in stored order.
/// - `find` on any other field: the first post with that exact value.
/// - otherwise: sort, keep posts passing every match and the range, then
///   skip `start` and take `count` of those.
pub fn run_query(posts: &[Post], query: &Query) -> Result<Vec<Post>> {
    match &query.find {
        Some(field) if field.name == FieldName::Id => Ok(posts
            .iter()
            .find(|p| p.id == field.value)
            .cloned()
            .into_iter()
            .collect()),
        Some(field) => run_find(posts, field),
        None if query.is_default() => Ok(posts.to_vec()),
        None => Ok(run_filter(posts, query)),
    }
}

fn run_find(posts: &[Post], field: &Field) -> Result<Vec<Post>> {
    let found = match field.name {
        FieldName::Created => {
            let created = parse_created(&field.value)?;
            posts.iter().find(|p| p.created == created)
        }
        name => posts.iter().find(|p| field_value(p, name) == field.value),
    };
    Ok(found.cloned().into_iter().collect())
}

fn run_filter(posts: &[Post], query: &Query) -> Vec<Post> {
    let start = query.start.map_or(0, |s| s as usize);
    let count = query.count.map_or(posts.len(), |c| c as usize);
    if count == 0 || start >= posts.len() {
        return Vec::new();
    }

    let mut sorted = posts.to_vec();
    post::sort_by(&mut sorted, query.sort_by, query.reverse);

    sorted
        .into_iter()
        .filter(|p| matches(query, p))
        .skip(start)
        .take(count)
        .collect()
}

fn matches(query: &Query, post: &Post) -> bool {
    if let Some(range) = &query.range {
        if !range.contains(&post.created) {
            return false;
        }
    }
    query
        .matches
        .iter()
        .all(|m| field_value(post, m.name).contains(m.value.as_str()))
}

fn field_value(post: &Post, name: FieldName) -> &str {
    match name {
        FieldName::Id => &post.id,
        FieldName::Title => &post.title,
        FieldName::Content => &post.content,
        FieldName::Created => "",
    }
}

fn parse_created(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            QueryError::InvalidTimestamp {
                what: "created",
                value: value.to_string(),
            }
            .into()
        })
}
