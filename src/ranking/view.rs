use serde::Serialize;

use crate::record::Record;

/// One delivery of a ranking query: the sorted window and its size.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingView {
    /// Number of entries in this window, not the size of the collection.
    pub total: usize,
    pub entries: Vec<Record>,
}

impl RankingView {
    pub fn new(entries: Vec<Record>) -> Self { Self { total: entries.len(), entries } }

    pub fn empty() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
