//! Leaderboard record shapes as they travel to and from the keyed store.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StoreError;

/// Duration attached to a record: a free-form label ("00:05:00") or a seconds count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordTime {
    Seconds(u64),
    Label(String),
}

impl RecordTime {
    /// Display form: labels verbatim, seconds as zero-padded `HH:MM:SS`.
    pub fn display(&self) -> String {
        match self {
            RecordTime::Label(s) => s.clone(),
            RecordTime::Seconds(secs) => format_hms(*secs),
        }
    }
}

impl From<&str> for RecordTime {
    fn from(s: &str) -> Self { RecordTime::Label(s.to_string()) }
}

impl From<u64> for RecordTime {
    fn from(secs: u64) -> Self { RecordTime::Seconds(secs) }
}

/// Render a seconds count as `HH:MM:SS`. Hours grow past two digits when needed.
pub fn format_hms(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Caller-supplied fields of a record to be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub score: f64,
    pub time: RecordTime,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, score: f64, time: impl Into<RecordTime>) -> Self {
        Self { name: name.into(), score, time: time.into() }
    }
}

/// A persisted leaderboard entry. Unknown fields are dropped on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub time: RecordTime,
    /// Epoch milliseconds, stamped by the store layer at creation.
    #[serde(rename = "createDate")]
    pub create_date: i64,
}

impl Record {
    pub(crate) fn from_new(id: String, fields: NewRecord, create_date: i64) -> Self {
        Self { id, name: fields.name, score: fields.score, time: fields.time, create_date }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.create_date).single()
    }

    pub(crate) fn to_value(&self) -> Result<Value, StoreError> {
        if !self.score.is_finite() {
            return Err(StoreError::Serialization(format!("score must be finite, got {}", self.score)));
        }
        Ok(serde_json::to_value(self)?)
    }

    pub(crate) fn from_value(v: Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(v)?)
    }
}
