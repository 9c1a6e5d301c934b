//! Stored block records
//!
//! Blocks built in the admin UI are stored as content records whose body is a
//! JSON block document. The host owns the storage; this module defines the
//! query the loader issues and an in-memory store.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Content type of stored block records
pub const BLOCK_POST_TYPE: &str = "block_lab";

/// Status of records that take part in loading
pub const PUBLISHED_STATUS: &str = "publish";

/// A stored content record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: u64,
    pub post_type: String,
    pub post_status: String,
    /// JSON block document
    pub content: String,
}

impl ContentRecord {
    /// A published block record with the given body
    pub fn published(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            post_type: BLOCK_POST_TYPE.to_string(),
            post_status: PUBLISHED_STATUS.to_string(),
            content: content.into(),
        }
    }

    /// Whether this record matches a query
    pub fn matches(&self, query: &RecordQuery) -> bool {
        self.post_type == query.post_type && self.post_status == query.post_status
    }
}

/// Filter applied when fetching records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub post_type: String,
    pub post_status: String,
}

impl RecordQuery {
    pub fn new(post_type: impl Into<String>, post_status: impl Into<String>) -> Self {
        Self {
            post_type: post_type.into(),
            post_status: post_status.into(),
        }
    }
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self::new(BLOCK_POST_TYPE, PUBLISHED_STATUS)
    }
}

/// Source of stored block records
pub trait ContentStore: Send + Sync {
    /// Every record matching the query, in store order
    fn query(&self, query: &RecordQuery) -> Vec<ContentRecord>;
}

/// In-memory record store
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: RwLock<Vec<ContentRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn insert(&self, record: ContentRecord) {
        self.records.write().push(record);
    }

    /// Remove a record by id, returning it if present
    pub fn remove(&self, id: u64) -> Option<ContentRecord> {
        let mut records = self.records.write();
        let index = records.iter().position(|record| record.id == id)?;
        Some(records.remove(index))
    }

    /// Number of stored records regardless of type or status
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl FromIterator<ContentRecord> for MemoryContentStore {
    fn from_iter<I: IntoIterator<Item = ContentRecord>>(iter: I) -> Self {
        Self {
            records: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl ContentStore for MemoryContentStore {
    fn query(&self, query: &RecordQuery) -> Vec<ContentRecord> {
        self.records
            .read()
            .iter()
            .filter(|record| record.matches(query))
            .cloned()
            .collect()
    }
}
