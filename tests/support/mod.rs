//! Shared fixtures for the integration tests.
#![allow(dead_code)]

pub mod doubles;
pub mod server;

use chrono::{DateTime, TimeZone, Utc};
use gol_storage::Post;

/// A fixed instant `secs` seconds after 2015-03-03T09:35:00Z.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 3, 3, 9, 35, 0).unwrap() + chrono::Duration::seconds(secs)
}

pub fn post(id: &str, title: &str, content: &str, secs: i64) -> Post {
    Post::with_id(id, title, content, at(secs))
}

/// Three posts, stored out of creation order.
pub fn three_posts() -> Vec<Post> {
    vec![
        post("2", "second post", "a realization.", 20),
        post("3", "third post", "more thoughts", 30),
        post("1", "first post", "something important!", 10),
    ]
}

pub fn ids(posts: &[Post]) -> Vec<String> {
    posts.iter().map(|p| p.id.clone()).collect()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
