//! Live and one-shot top-N ranking queries.
//!
//! The store can only order ascending, so a descending top-N asks for the last N
//! children by the sort field and an ascending one for the first N. Whatever window
//! arrives is re-sorted locally in the requested direction before delivery.
//! Updates are delivered from a single pump task per subscription, in push order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::{RankingError, RankingResult};
use crate::identity::AuthSession;
use crate::logger::{messages, Area, Logger};
use crate::record::Record;
use crate::storage::{KeyedStore, Limit, PathQuery, Snapshot, StoreError};

mod sort;
mod view;

pub use sort::{Direction, SortField, SortSpec};
pub use view::RankingView;

/// Ranking queries over one collection of the keyed store.
pub struct LiveRankingQuery {
    store: Arc<dyn KeyedStore>,
    session: Arc<AuthSession>,
    collection: String,
    lazy_sign_in: bool,
    logger: Logger,
}

impl LiveRankingQuery {
    pub fn new(store: Arc<dyn KeyedStore>, session: Arc<AuthSession>, collection: impl Into<String>) -> Self {
        let logger = session.logger();
        Self { store, session, collection: collection.into(), lazy_sign_in: true, logger }
    }

    /// When enabled (default), a caller without any identity is signed in anonymously
    /// once before the query is issued. Disable for strict "already signed in" reads.
    pub fn with_lazy_sign_in(mut self, enabled: bool) -> Self {
        self.lazy_sign_in = enabled;
        self
    }

    /// Store query for a top-N window under `spec`.
    pub fn query_for(&self, spec: SortSpec, top_n: usize) -> PathQuery {
        let limit = match spec.direction {
            Direction::Descending => Limit::Last(top_n),
            Direction::Ascending => Limit::First(top_n),
        };
        PathQuery::new(self.collection.as_str(), spec.field.as_child_key(), limit)
    }

    /// Open a live subscription. `on_update` receives the first window right away
    /// (`{total: 0, entries: []}` for an empty collection) and a new one on every change.
    ///
    /// Must be called inside a tokio runtime. The returned handle stops delivery when
    /// `unsubscribe` is called or when it is dropped.
    pub async fn subscribe<F>(&self, spec: SortSpec, top_n: usize, on_update: F) -> RankingResult<RankingSubscription>
    where
        F: FnMut(RankingView) + Send + 'static,
    {
        self.session.require_reader(self.lazy_sign_in).await?;
        let sub = self.store.subscribe(self.query_for(spec, top_n)).map_err(|e| {
            self.logger.warn(Area::Ranking, messages::USER_LIST_FAIL, &e);
            RankingError::Store(e)
        })?;
        let (mut events, detach) = sub.into_parts();
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let logger = self.logger;
        let mut on_update = on_update;
        let task = tokio::spawn(async move {
            while let Some(ev) = events.recv().await {
                if !flag.load(Ordering::SeqCst) { break; }
                match ev {
                    Ok(snapshot) => on_update(view_from_snapshot(spec, snapshot, &logger)),
                    Err(e) => {
                        logger.warn(Area::Ranking, messages::USER_LIST_FAIL, &e);
                        break;
                    }
                }
            }
        });
        self.logger.debug(Area::Ranking, "ranking subscription opened.");
        Ok(RankingSubscription { active, detach: Mutex::new(Some(detach)), task: Mutex::new(Some(task)) })
    }

    /// Read the current top-N window once without keeping a listener attached.
    pub async fn fetch_once(&self, spec: SortSpec, top_n: usize) -> RankingResult<RankingView> {
        self.session.require_reader(self.lazy_sign_in).await?;
        let mut sub = self.store.subscribe(self.query_for(spec, top_n)).map_err(|e| {
            self.logger.warn(Area::Ranking, messages::USER_LIST_FAIL, &e);
            RankingError::Store(e)
        })?;
        let first = sub.events.recv().await;
        sub.detach();
        match first {
            Some(Ok(snapshot)) => Ok(view_from_snapshot(spec, snapshot, &self.logger)),
            Some(Err(e)) => {
                self.logger.warn(Area::Ranking, messages::USER_LIST_FAIL, &e);
                Err(RankingError::Store(e))
            }
            None => {
                let e = StoreError::Unavailable("subscription closed before first snapshot".into());
                self.logger.warn(Area::Ranking, messages::USER_LIST_FAIL, &e);
                Err(RankingError::Store(e))
            }
        }
    }
}

/// Decode a window and sort it. Children that do not decode as records are skipped.
pub fn view_from_snapshot(spec: SortSpec, snapshot: Snapshot, logger: &Logger) -> RankingView {
    let mut records: Vec<Record> = Vec::with_capacity(snapshot.len());
    for (key, value) in snapshot.entries {
        match Record::from_value(value) {
            Ok(r) => records.push(r),
            Err(e) => logger.warn(Area::Ranking, &format!("skipping malformed entry '{}'.", key), &e),
        }
    }
    spec.sort(&mut records);
    RankingView::new(records)
}

/// Handle of a live ranking subscription.
pub struct RankingSubscription {
    active: Arc<AtomicBool>,
    detach: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RankingSubscription {
    /// Detach the store listener and stop the pump. Idempotent.
    ///
    /// Changes made after this returns are never delivered. A callback that is
    /// already running may still complete.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(detach) = self.detach.lock().take() { detach(); }
        if let Some(task) = self.task.lock().take() { task.abort(); }
    }

    pub fn is_active(&self) -> bool { self.active.load(Ordering::SeqCst) }
}

impl Drop for RankingSubscription {
    fn drop(&mut self) { self.unsubscribe(); }
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod ranking_tests;
