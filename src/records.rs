//! Permission-gated CRUD over the ranked records of one collection.
//!
//! Writes need a named session; the check runs before any remote call so an
//! unauthorized caller fails locally. Ids are validated before every by-id
//! operation. Nothing here retries: one attempt, then a classified outcome.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{RankingError, RankingResult};
use crate::ident::{is_valid_record_id, new_record_id};
use crate::identity::{AuthSession, Operation};
use crate::logger::{messages, Area, Logger};
use crate::record::{NewRecord, Record};
use crate::storage::paths::record_path;
use crate::storage::{KeyedStore, StoreError};

pub struct RecordStore {
    store: Arc<dyn KeyedStore>,
    session: Arc<AuthSession>,
    collection: String,
    lazy_sign_in: bool,
    logger: Logger,
}

impl RecordStore {
    pub fn new(store: Arc<dyn KeyedStore>, session: Arc<AuthSession>, collection: impl Into<String>) -> Self {
        let logger = session.logger();
        Self { store, session, collection: collection.into(), lazy_sign_in: true, logger }
    }

    /// See `LiveRankingQuery::with_lazy_sign_in`; applies to `get_by_id`.
    pub fn with_lazy_sign_in(mut self, enabled: bool) -> Self {
        self.lazy_sign_in = enabled;
        self
    }

    pub fn collection(&self) -> &str { &self.collection }

    fn check_id(&self, id: &str) -> RankingResult<()> {
        if is_valid_record_id(id) {
            return Ok(());
        }
        self.logger.info(Area::Store, messages::PLEASE_INSERT_CORRECT_USERID);
        Err(RankingError::InvalidIdentifier(id.to_string()))
    }

    /// Classify a failed remote write: a session that no longer authorizes writes
    /// turns it into `WriteRejected`, anything else stays a store error.
    fn write_failure(&self, path: &str, err: StoreError, msg: &str) -> RankingError {
        self.logger.warn(Area::Store, msg, &err);
        if self.session.is_authorized_writer() {
            RankingError::Store(err)
        } else {
            RankingError::WriteRejected(path.to_string())
        }
    }

    /// Create a record with a fresh id and `createDate = now`.
    ///
    /// The id is not returned; query the collection to find the new record.
    pub async fn create(&self, fields: NewRecord) -> RankingResult<()> {
        self.session.require_writer(Operation::Create)?;
        let id = new_record_id();
        let path = record_path(&self.collection, &id);
        let record = Record::from_new(id.clone(), fields, Utc::now().timestamp_millis());
        let value = record.to_value().map_err(|e| self.write_failure(&path, e, messages::USER_CREATED_FAIL))?;
        match self.store.write(&path, value).await {
            Ok(()) => {
                self.logger.info_id(Area::Store, messages::USER_CREATED, &id);
                Ok(())
            }
            Err(e) => Err(self.write_failure(&path, e, messages::USER_CREATED_FAIL)),
        }
    }

    /// Replace the record at `id` with `record` (full replace, no merge, no version check).
    /// The stored `id` field is always the path id.
    pub async fn update(&self, id: &str, record: &Record) -> RankingResult<()> {
        self.session.require_writer(Operation::Update)?;
        self.check_id(id)?;
        let path = record_path(&self.collection, id);
        let pinned = Record { id: id.to_string(), ..record.clone() };
        let value = pinned.to_value().map_err(|e| self.write_failure(&path, e, messages::USER_UPDATED_FAIL))?;
        match self.store.write(&path, value).await {
            Ok(()) => {
                self.logger.info_id(Area::Store, messages::USER_UPDATED, id);
                Ok(())
            }
            Err(e) => Err(self.write_failure(&path, e, messages::USER_UPDATED_FAIL)),
        }
    }

    /// Remove the record at `id`. Removing a missing record succeeds.
    pub async fn delete(&self, id: &str) -> RankingResult<()> {
        self.session.require_writer(Operation::Delete)?;
        self.check_id(id)?;
        let path = record_path(&self.collection, id);
        match self.store.remove(&path).await {
            Ok(()) => {
                self.logger.info_id(Area::Store, messages::USER_DELETED, id);
                Ok(())
            }
            Err(e) => Err(self.write_failure(&path, e, messages::USER_DELETED_FAIL)),
        }
    }

    /// Read one record.
    ///
    /// Needs some identity; with lazy sign-in enabled a caller without one is signed
    /// in anonymously first. Absent, undecodable and unreadable records all come back
    /// as `NotFound` (the cause is logged).
    pub async fn get_by_id(&self, id: &str) -> RankingResult<Record> {
        self.check_id(id)?;
        self.session.require_reader(self.lazy_sign_in).await?;
        let path = record_path(&self.collection, id);
        let found = match self.store.read_once(&path).await {
            Ok(Some(v)) => Record::from_value(v),
            Ok(None) => {
                self.logger.debug(Area::Store, &format!("no record at '{}'.", path));
                return Err(RankingError::NotFound(path));
            }
            Err(e) => Err(e),
        };
        found.map_err(|e| {
            self.logger.warn(Area::Store, messages::USER_GET_FAIL, &e);
            RankingError::NotFound(path)
        })
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
