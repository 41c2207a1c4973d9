use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{Record, RecordTime};
use crate::storage::order::compare_values;

/// Record attribute a ranking can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "createDate")]
    CreateDate,
    #[serde(rename = "name")]
    Name,
}

impl SortField {
    /// Child key the store orders by.
    pub fn as_child_key(&self) -> &'static str {
        match self {
            SortField::Score => "score",
            SortField::Time => "time",
            SortField::CreateDate => "createDate",
            SortField::Name => "name",
        }
    }

    fn value_of(&self, r: &Record) -> Value {
        match self {
            SortField::Score => serde_json::Number::from_f64(r.score).map(Value::Number).unwrap_or(Value::Null),
            SortField::Time => match &r.time {
                RecordTime::Seconds(s) => Value::from(*s),
                RecordTime::Label(l) => Value::String(l.clone()),
            },
            SortField::CreateDate => Value::from(r.create_date),
            SortField::Name => Value::String(r.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for SortSpec {
    fn default() -> Self { Self { field: SortField::Score, direction: Direction::Descending } }
}

impl SortSpec {
    pub fn new(field: SortField, direction: Direction) -> Self { Self { field, direction } }

    /// Compare two records under this spec using the store's value order. No secondary key.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = compare_values(Some(&self.field.value_of(a)), Some(&self.field.value_of(b)));
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }

    /// Stable sort in place: equal keys keep their read order.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}
