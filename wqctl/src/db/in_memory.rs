//! In-memory record store.
//!
//! Stores all documents in memory behind a lock. It's suitable for tests and single-process
//! deployments. Documents are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::db::errors::{DbError, Result};
use crate::db::store::{Document, RecordKind, RecordStore, SEQUENCE_MAX};

#[derive(Default)]
struct Tables {
    /// Documents keyed by (kind, id), tagged with an insertion sequence for stable listing
    documents: HashMap<(RecordKind, String), (u64, Document)>,
    next_seq: u64,
    sequences: HashMap<String, u32>,
}

impl Tables {
    fn list<F>(&self, kind: RecordKind, predicate: F) -> Vec<Document>
    where
        F: Fn(&Document) -> bool,
    {
        let mut matching: Vec<&(u64, Document)> = self
            .documents
            .iter()
            .filter(|((k, _), (_, doc))| *k == kind && predicate(doc))
            .map(|(_, entry)| entry)
            .collect();
        matching.sort_by_key(|(seq, _)| *seq);
        matching.into_iter().map(|(_, doc)| doc.clone()).collect()
    }
}

/// In-memory implementation of [`RecordStore`].
///
/// # Example
/// ```ignore
/// let store = InMemoryStore::new();
/// let points = Records::<TestingPoint>::new(Arc::new(store));
/// points.save(&point).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Document>> {
        let tables = self.tables.read();
        Ok(tables.documents.get(&(kind, id.to_string())).map(|(_, doc)| doc.clone()))
    }

    async fn find_all_by_organization(&self, kind: RecordKind, organization_id: &str) -> Result<Vec<Document>> {
        let tables = self.tables.read();
        Ok(tables.list(kind, |doc| doc.organization_id == organization_id))
    }

    async fn find_all_by_organization_and_status(
        &self,
        kind: RecordKind,
        organization_id: &str,
        status: &str,
    ) -> Result<Vec<Document>> {
        let tables = self.tables.read();
        Ok(tables.list(kind, |doc| {
            doc.organization_id == organization_id && doc.status.as_deref() == Some(status)
        }))
    }

    async fn find_all(&self, kind: RecordKind) -> Result<Vec<Document>> {
        let tables = self.tables.read();
        Ok(tables.list(kind, |_| true))
    }

    async fn save(&self, document: Document) -> Result<Document> {
        let mut tables = self.tables.write();
        let key = (document.kind, document.id.clone());

        // Replacing a document keeps its original position in listings
        let seq = match tables.documents.get(&key) {
            Some((seq, _)) => *seq,
            None => {
                let seq = tables.next_seq;
                tables.next_seq += 1;
                seq
            }
        };

        tables.documents.insert(key, (seq, document.clone()));
        Ok(document)
    }

    async fn delete_by_id(&self, kind: RecordKind, id: &str) -> Result<()> {
        let mut tables = self.tables.write();
        tables.documents.remove(&(kind, id.to_string()));
        Ok(())
    }

    async fn advance_sequence(&self, name: &str, floor: u32) -> Result<u32> {
        let mut tables = self.tables.write();
        let counter = tables.sequences.entry(name.to_string()).or_insert(0);
        let next = (*counter)
            .max(floor)
            .checked_add(1)
            .filter(|next| *next <= SEQUENCE_MAX)
            .ok_or_else(|| DbError::Other(anyhow!("sequence {name} is exhausted")))?;
        *counter = next;
        Ok(next)
    }
}
