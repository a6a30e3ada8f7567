//! A minimal gol HTTP surface over any store, for exercising `RemoteStore`.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use gol_storage::{query, Post, Store, StoreError};
use serde_json::json;

type SharedStore = Arc<dyn Store>;

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).post(update_post).delete(delete_post),
        )
        .with_state(store)
}

/// Serve `store` on an ephemeral port from a background runtime; returns `host:port`.
pub fn start_server(store: SharedStore) -> String {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router(store)).await.unwrap();
        });
    });
    rx.recv().unwrap().to_string()
}

fn error_response(err: StoreError) -> Response {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
        StoreError::Query(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn list_posts(
    State(store): State<SharedStore>,
    RawQuery(raw): RawQuery,
) -> Response {
    let result = match raw.filter(|q| !q.is_empty()) {
        None => store.find_all(),
        Some(raw) => match query::from_params(url::form_urlencoded::parse(raw.as_bytes())) {
            Ok(q) => store.find(&q),
            Err(e) => Err(e.into()),
        },
    };
    match result {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_post(State(store): State<SharedStore>, Path(id): Path<String>) -> Response {
    match store.find_by_id(&id) {
        Ok(post) => Json(post).into_response(),
        Err(e) => error_response(e),
    }
}

async fn create_post(State(store): State<SharedStore>, Json(post): Json<Post>) -> Response {
    match store.create(post.clone()) {
        Ok(()) => (StatusCode::ACCEPTED, Json(post)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_post(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(mut post): Json<Post>,
) -> Response {
    post.id = id;
    match store.update(post.clone()) {
        Ok(()) => (StatusCode::ACCEPTED, Json(post)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_post(State(store): State<SharedStore>, Path(id): Path<String>) -> Response {
    match store.delete(&id) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(e),
    }
}
