//! The record store contract.
//!
//! A record store is a key-value store of JSON documents partitioned by [`RecordKind`]. Each
//! document carries a small set of indexed columns (organization and status) next to the full
//! record body, which is all the service layer needs to query. No transactional guarantees are
//! assumed across multiple calls; the only atomic operation is [`RecordStore::advance_sequence`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::db::errors::Result;

/// Largest value a code sequence may hold. Counters are 32-bit signed integers in PostgreSQL.
pub const SEQUENCE_MAX: u32 = i32::MAX as u32;

/// The kinds of records held in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    TestingPoint,
    QualityTest,
    DailyRecord,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::TestingPoint => "testing_point",
            RecordKind::QualityTest => "quality_test",
            RecordKind::DailyRecord => "daily_record",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record: indexed columns plus the serialized body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub kind: RecordKind,
    pub id: String,
    pub organization_id: String,
    pub status: Option<String>,
    pub body: serde_json::Value,
}

/// Key-value record store consumed by the service layer.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get a single document by kind and id
    async fn find_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Document>>;

    /// List every document of a kind owned by an organization, in insertion order
    async fn find_all_by_organization(&self, kind: RecordKind, organization_id: &str) -> Result<Vec<Document>>;

    /// List documents of a kind owned by an organization with the given status
    async fn find_all_by_organization_and_status(
        &self,
        kind: RecordKind,
        organization_id: &str,
        status: &str,
    ) -> Result<Vec<Document>>;

    /// List every document of a kind regardless of owner
    async fn find_all(&self, kind: RecordKind) -> Result<Vec<Document>>;

    /// Insert or replace a document, keyed by (kind, id)
    async fn save(&self, document: Document) -> Result<Document>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete_by_id(&self, kind: RecordKind, id: &str) -> Result<()>;

    /// Atomically advance the named counter to `max(current, floor) + 1` and return the new value.
    ///
    /// A counter that does not exist yet behaves as if it held zero. Fails instead of moving
    /// past [`SEQUENCE_MAX`].
    async fn advance_sequence(&self, name: &str, floor: u32) -> Result<u32>;
}

/// A typed entity that can be stored as a [`Document`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    fn id(&self) -> &str;

    fn organization_id(&self) -> &str;

    /// Value of the indexed status column, if the record has one
    fn status(&self) -> Option<String> {
        None
    }
}
