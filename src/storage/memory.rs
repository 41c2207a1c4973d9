use std::collections::HashMap as StdHashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::order::compare_children;
use super::paths;
use super::{KeyedStore, Limit, PathQuery, Snapshot, SnapshotEvent, StoreError, StoreSubscription};

struct Listener {
    query: PathQuery,
    tx: mpsc::UnboundedSender<SnapshotEvent>,
}

struct Inner {
    /// Whole tree; always an object at the root.
    root: RwLock<Value>,
    listeners: Mutex<StdHashMap<u64, Listener>>,
    next_listener: AtomicU64,
    offline: AtomicBool,
    deny_writes: AtomicBool,
}

/// In-process realtime keyed store.
///
/// Behaves like the remote store the client talks to: full-replace writes,
/// idempotent removes, ascending "order by child" windows and push-on-change
/// listeners. Cloning shares the same tree.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new() }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                root: RwLock::new(Value::Object(Map::new())),
                listeners: Mutex::new(StdHashMap::new()),
                next_listener: AtomicU64::new(1),
                offline: AtomicBool::new(false),
                deny_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Simulate a lost connection: every call fails with `Unavailable` until reset.
    pub fn set_offline(&self, offline: bool) { self.inner.offline.store(offline, AtomicOrdering::SeqCst); }

    /// Simulate security rules that refuse all writes and removes.
    pub fn set_deny_writes(&self, deny: bool) { self.inner.deny_writes.store(deny, AtomicOrdering::SeqCst); }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize { self.inner.listeners.lock().len() }

    /// Number of direct children stored under `path`.
    pub fn child_count(&self, path: &str) -> usize {
        let root = self.inner.root.read();
        match get_at(&root, &paths::segments(path)) {
            Some(Value::Object(m)) => m.len(),
            _ => 0,
        }
    }

    /// Push `err` to every listener and drop them, as the remote store does when it revokes a query.
    pub fn cancel_listeners(&self, err: StoreError) {
        let drained: Vec<Listener> = self.inner.listeners.lock().drain().map(|(_, l)| l).collect();
        for l in drained {
            let _ = l.tx.send(Err(err.clone()));
        }
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.inner.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("client is offline".into()));
        }
        Ok(())
    }

    fn check_writable(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.check_online()?;
        if !paths::is_valid_path(path) {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        if self.inner.deny_writes.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::PermissionDenied(paths::normalize(path)));
        }
        Ok(paths::segments(path))
    }

    /// Recompute and push the window of every listener whose path overlaps `changed`.
    fn notify(&self, changed: &str) {
        let root = self.inner.root.read();
        let mut listeners = self.inner.listeners.lock();
        let mut dead: Vec<u64> = Vec::new();
        for (id, l) in listeners.iter() {
            if !paths::overlaps(&l.query.path, changed) { continue; }
            if l.tx.send(Ok(window(&root, &l.query))).is_err() { dead.push(*id); }
        }
        for id in dead { listeners.remove(&id); }
        debug!(target: "ranking_builder::store", "memory store change at '{}' notified {} listener(s)", changed, listeners.len());
    }
}

#[async_trait]
impl KeyedStore for MemoryStore {
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segs = self.check_writable(path)?;
        {
            let mut root = self.inner.root.write();
            if value.is_null() { remove_at(&mut root, &segs); } else { set_at(&mut root, &segs, value); }
        }
        self.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let segs = self.check_writable(path)?;
        let removed = remove_at(&mut self.inner.root.write(), &segs);
        if removed { self.notify(path); }
        Ok(())
    }

    async fn read_once(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check_online()?;
        let root = self.inner.root.read();
        Ok(get_at(&root, &paths::segments(path)).cloned())
    }

    fn subscribe(&self, query: PathQuery) -> Result<StoreSubscription, StoreError> {
        self.check_online()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_listener.fetch_add(1, AtomicOrdering::SeqCst);
        {
            // Hold the tree lock while registering so no change slips between the
            // initial window and the first push.
            let root = self.inner.root.read();
            let _ = tx.send(Ok(window(&root, &query)));
            self.inner.listeners.lock().insert(id, Listener { query, tx });
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let detach = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.lock().remove(&id);
            }
        });
        Ok(StoreSubscription::new(rx, detach))
    }
}

fn window(root: &Value, query: &PathQuery) -> Snapshot {
    let mut entries: Vec<(String, Value)> = match get_at(root, &paths::segments(&query.path)) {
        Some(Value::Object(m)) => m.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => Vec::new(),
    };
    entries.sort_by(|a, b| compare_children(&query.order_by_child, (&a.0, &a.1), (&b.0, &b.1)));
    match query.limit {
        Limit::First(n) => entries.truncate(n),
        Limit::Last(n) => {
            let skip = entries.len().saturating_sub(n);
            entries.drain(..skip);
        }
    }
    Snapshot { entries }
}

fn get_at<'a>(root: &'a Value, segs: &[String]) -> Option<&'a Value> {
    let mut cur = root;
    for s in segs {
        cur = cur.as_object()?.get(s)?;
    }
    Some(cur)
}

fn set_at(root: &mut Value, segs: &[String], value: Value) {
    let Some((last, parents)) = segs.split_last() else {
        *root = value;
        return;
    };
    let mut cur = root;
    for s in parents {
        if !cur.is_object() { *cur = Value::Object(Map::new()); }
        let Value::Object(m) = cur else { return; };
        cur = m.entry(s.clone()).or_insert_with(|| Value::Object(Map::new()));
    }
    if !cur.is_object() { *cur = Value::Object(Map::new()); }
    if let Value::Object(m) = cur { m.insert(last.clone(), value); }
}

/// Remove the node at `segs` and prune parents left empty. Returns true if something was removed.
fn remove_at(node: &mut Value, segs: &[String]) -> bool {
    let Some((first, rest)) = segs.split_first() else { return false; };
    let Value::Object(m) = node else { return false; };
    if rest.is_empty() {
        return m.remove(first).is_some();
    }
    let Some(child) = m.get_mut(first) else { return false; };
    let removed = remove_at(child, rest);
    if removed && child.as_object().map(|c| c.is_empty()).unwrap_or(false) {
        m.remove(first);
    }
    removed
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
