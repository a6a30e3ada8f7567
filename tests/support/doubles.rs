//! Store test doubles for exercising the multi store.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

use gol_storage::{MemoryStore, Post, Query, Result, Store, StoreError};

pub const WAIT: Duration = Duration::from_secs(5);

/// Reads fail, and every write fails after reporting which operation was tried.
pub struct FailingStore {
    attempts: Mutex<Sender<&'static str>>,
}

impl FailingStore {
    pub fn new() -> (Self, Receiver<&'static str>) {
        let (tx, rx) = channel();
        (
            Self {
                attempts: Mutex::new(tx),
            },
            rx,
        )
    }

    fn fail(&self, operation: &'static str) -> StoreError {
        if let Ok(tx) = self.attempts.lock() {
            let _ = tx.send(operation);
        }
        StoreError::UnexpectedStatus {
            status: 503,
            reason: "Service Unavailable".into(),
        }
    }
}

impl Store for FailingStore {
    fn find(&self, _query: &Query) -> Result<Vec<Post>> {
        Err(self.fail("find"))
    }

    fn find_by_id(&self, _id: &str) -> Result<Post> {
        Err(self.fail("find_by_id"))
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        Err(self.fail("find_all"))
    }

    fn create(&self, _post: Post) -> Result<()> {
        Err(self.fail("create"))
    }

    fn update(&self, _post: Post) -> Result<()> {
        Err(self.fail("update"))
    }

    fn delete(&self, _id: &str) -> Result<()> {
        Err(self.fail("delete"))
    }
}

/// A memory store whose writes wait for a release signal, then report completion.
pub struct GatedStore {
    inner: MemoryStore,
    gate: Mutex<Receiver<()>>,
    done: Mutex<Sender<&'static str>>,
}

pub struct GateHandle {
    pub release: Sender<()>,
    pub done: Receiver<&'static str>,
    pub records: MemoryStore,
}

impl GatedStore {
    pub fn new() -> (Self, GateHandle) {
        let (release, gate) = channel();
        let (done_tx, done) = channel();
        let inner = MemoryStore::new();
        let handle = GateHandle {
            release,
            done,
            records: inner.clone(),
        };
        (
            Self {
                inner,
                gate: Mutex::new(gate),
                done: Mutex::new(done_tx),
            },
            handle,
        )
    }

    fn gated<F>(&self, operation: &'static str, write: F) -> Result<()>
    where
        F: FnOnce(&MemoryStore) -> Result<()>,
    {
        self.gate
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))?
            .recv_timeout(WAIT)
            .map_err(|_| StoreError::Config(format!("{operation} never released")))?;
        let result = write(&self.inner);
        if let Ok(tx) = self.done.lock() {
            let _ = tx.send(operation);
        }
        result
    }
}

impl Store for GatedStore {
    fn find(&self, query: &Query) -> Result<Vec<Post>> {
        self.inner.find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Post> {
        self.inner.find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Post>> {
        self.inner.find_all()
    }

    fn create(&self, post: Post) -> Result<()> {
        self.gated("create", |s| s.create(post))
    }

    fn update(&self, post: Post) -> Result<()> {
        self.gated("update", |s| s.update(post))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.gated("delete", |s| s.delete(id))
    }
}
