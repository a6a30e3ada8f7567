//! Post - the single record type held by every store.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::SortField;

/// One blog entry.
///
/// `id` and `created` are fixed when the post is created; only `title` and
/// `content` change afterwards, through [`Store::update`](crate::Store::update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
}

impl Post {
    /// Create a post with a fresh id, stamped with the current time.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            created: Utc::now(),
        }
    }

    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            created,
        }
    }

    /// Apply a partial update: non-empty `title`/`content` on `update` win,
    /// empty ones leave the stored value alone. `id` and `created` never change.
    pub fn merge(&mut self, update: &Post) {
        if !update.title.is_empty() {
            self.title = update.title.clone();
        }
        if !update.content.is_empty() {
            self.content = update.content.clone();
        }
    }
}

/// Oldest first.
pub fn by_created(a: &Post, b: &Post) -> Ordering {
    a.created.cmp(&b.created)
}

/// Lexicographic by title.
pub fn by_title(a: &Post, b: &Post) -> Ordering {
    a.title.cmp(&b.title)
}

/// Sort posts in place by `field`, descending when `reverse` is set.
pub fn sort_by(posts: &mut [Post], field: SortField, reverse: bool) {
    let compare = match field {
        SortField::Created => by_created,
        SortField::Title => by_title,
    };
    if reverse {
        posts.sort_by(|a, b| compare(b, a));
    } else {
        posts.sort_by(compare);
    }
}
