//! RemoteStore - a store backed by another gol instance over HTTP.
//!
//! ## Routes used
//!
//! - `GET /posts?<query params>`: find and find all
//! - `GET /posts/{id}`: find by id
//! - `POST /posts`: create, expects `202 Accepted`
//! - `POST /posts/{id}`: update, expects `202 Accepted`
//! - `DELETE /posts/{id}`: delete, expects `200 OK`
//!
//! Ids are percent-encoded as a single path segment. Any status of 400 or
//! above is an error.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{Result, StoreError};
use crate::post::Post;
use crate::query::{to_params, Query};
use crate::registry::{Backend, Registry};
use crate::store::Store;

pub const SCHEME: &str = "gol";

/// Opens a [`RemoteStore`] for `gol://host[:port]`.
#[derive(Debug, Clone, Default)]
pub struct RemoteBackend;

impl Backend for RemoteBackend {
    fn open(&self, url: &Url, _registry: &Registry) -> Result<Box<dyn Store>> {
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| StoreError::Config(format!("no host in {url}")))?;
        let addr = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Box::new(RemoteStore::new(addr)))
    }
}

#[derive(Debug, Clone)]
pub struct RemoteStore {
    base: String,
    client: Client,
}

impl RemoteStore {
    /// Talk to the gol instance listening at `addr` (`host:port`).
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self {
            base: format!("http://{}", addr.as_ref()),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `{base}/posts`, or `{base}/posts/{id}` with `id` as one encoded segment.
    fn posts_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/posts", self.base))?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| StoreError::Config(format!("{} cannot take a path", self.base)))?
                .push(id);
        }
        Ok(url)
    }

    fn request(&self, method: Method, id: Option<&str>) -> Result<RequestBuilder> {
        let url = self.posts_url(id)?;
        log::debug!("remote {} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json"))
    }

    /// Send `req`, mapping error statuses; a 404 on a single post is `NotFound(id)`.
    fn send(&self, req: RequestBuilder, id: Option<&str>) -> Result<Response> {
        let resp = req.send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }
        if status.as_u16() >= 400 {
            return Err(unexpected(status));
        }
        Ok(resp)
    }

    fn expect_status(resp: Response, expected: StatusCode) -> Result<()> {
        if resp.status() == expected {
            Ok(())
        } else {
            Err(unexpected(resp.status()))
        }
    }
}

fn unexpected(status: StatusCode) -> StoreError {
    StoreError::UnexpectedStatus {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("unknown").to_string(),
    }
}

impl Store for RemoteStore {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        let req = self.request(Method::GET, None)?.query(&to_params(query));
        Ok(self.send(req, None)?.json()?)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        let req = self.request(Method::GET, Some(id))?;
        Ok(self.send(req, Some(id))?.json()?)
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        let req = self.request(Method::GET, None)?;
        Ok(self.send(req, None)?.json()?)
    }

    fn create(&self, post: Post) -> Result<()> {
        let req = self.request(Method::POST, None)?.json(&post);
        Self::expect_status(self.send(req, None)?, StatusCode::ACCEPTED)
    }

    fn update(&self, post: Post) -> Result<()> {
        let req = self.request(Method::POST, Some(&post.id))?.json(&post);
        Self::expect_status(self.send(req, Some(&post.id))?, StatusCode::ACCEPTED)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let req = self.request(Method::DELETE, Some(id))?;
        Self::expect_status(self.send(req, Some(id))?, StatusCode::OK)
    }
}
