//!
//! ranking_builder storage module
//! ------------------------------
//! Seam between the ranking client and the remote realtime keyed store. The
//! store is a tree of JSON values addressed by slash-separated paths such as
//! `users/<id>`. Writes replace the whole value at a path, removes delete the
//! subtree, and subscriptions push a fresh ordered window of a path's children
//! every time something beneath it changes.
//!
//! Key responsibilities:
//! - `KeyedStore`: the async contract every backend implements.
//! - `PathQuery`: "order by child field, limit to first/last N" queries.
//! - `Snapshot` / `StoreSubscription`: what a subscription delivers and how it is detached.
//! - `order`: the store's value ordering, shared with the local re-sort.
//!
//! `MemoryStore` is the in-process backend used by tests and the demo binary.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

pub mod memory;
pub mod order;
pub mod paths;

pub use memory::MemoryStore;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("permission denied at '{0}'")]
    PermissionDenied(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self { StoreError::Serialization(err.to_string()) }
}

/// Window bound of a query. The store only orders ascending; `Last(n)` is the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    First(usize),
    Last(usize),
}

/// Ordered, bounded query over the children of `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    pub path: String,
    pub order_by_child: String,
    pub limit: Limit,
}

impl PathQuery {
    pub fn new(path: impl Into<String>, order_by_child: impl Into<String>, limit: Limit) -> Self {
        Self { path: paths::normalize(&path.into()), order_by_child: order_by_child.into(), limit }
    }
}

/// Children returned for a query, in the store's ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub entries: Vec<(String, Value)>,
}

impl Snapshot {
    pub fn exists(&self) -> bool { !self.entries.is_empty() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

pub type SnapshotEvent = Result<Snapshot, StoreError>;

/// Live listener handed out by `KeyedStore::subscribe`.
///
/// Events arrive on `events` in push order. Calling `detach` removes the listener
/// from the store synchronously; nothing pushed afterwards reaches the queue.
pub struct StoreSubscription {
    pub events: mpsc::UnboundedReceiver<SnapshotEvent>,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl StoreSubscription {
    pub fn new(events: mpsc::UnboundedReceiver<SnapshotEvent>, detach: Box<dyn FnOnce() + Send>) -> Self {
        Self { events, detach: Some(detach) }
    }

    pub fn detach(&mut self) {
        if let Some(f) = self.detach.take() { f(); }
    }

    /// Split into the event queue and a one-shot detach handle.
    pub fn into_parts(mut self) -> (mpsc::UnboundedReceiver<SnapshotEvent>, Box<dyn FnOnce() + Send>) {
        let detach = self.detach.take().unwrap_or_else(|| Box::new(|| {}));
        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);
        let events = std::mem::replace(&mut self.events, rx);
        (events, detach)
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) { self.detach(); }
}

#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Replace the value at `path` (creating intermediate nodes).
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;
    /// Remove the subtree at `path`. Removing a missing path succeeds.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;
    /// Read the value at `path`; `None` when nothing is stored there.
    async fn read_once(&self, path: &str) -> Result<Option<Value>, StoreError>;
    /// Attach a live listener; the current window is pushed immediately.
    fn subscribe(&self, query: PathQuery) -> Result<StoreSubscription, StoreError>;
}
