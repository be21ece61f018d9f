//! Typed repository over the document store.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::instrument;

use crate::db::errors::{DbError, Result};
use crate::db::store::{Document, Record, RecordStore};

/// A typed view of one record kind in a [`RecordStore`].
///
/// Encodes records into documents on the way in and decodes them on the way out, so the
/// service layer only ever deals with domain types.
pub struct Records<T> {
    store: Arc<dyn RecordStore>,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T: Record> Records<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    fn decode(document: Document) -> Result<T> {
        serde_json::from_value(document.body).map_err(|source| DbError::Decode {
            kind: T::KIND,
            id: document.id,
            source,
        })
    }

    fn decode_all(documents: Vec<Document>) -> Result<Vec<T>> {
        documents.into_iter().map(Self::decode).collect()
    }

    fn encode(record: &T) -> Result<Document> {
        let body = serde_json::to_value(record).map_err(|source| DbError::Encode { kind: T::KIND, source })?;
        Ok(Document {
            kind: T::KIND,
            id: record.id().to_string(),
            organization_id: record.organization_id().to_string(),
            status: record.status(),
            body,
        })
    }

    #[instrument(skip(self), fields(kind = %T::KIND), err)]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        self.store.find_by_id(T::KIND, id).await?.map(Self::decode).transpose()
    }

    /// Get a record by id, treating a record owned by another organization as absent
    pub async fn find_by_id_in_organization(&self, id: &str, organization_id: &str) -> Result<Option<T>> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(|record| record.organization_id() == organization_id))
    }

    #[instrument(skip(self), fields(kind = %T::KIND), err)]
    pub async fn find_all_by_organization(&self, organization_id: &str) -> Result<Vec<T>> {
        Self::decode_all(self.store.find_all_by_organization(T::KIND, organization_id).await?)
    }

    #[instrument(skip(self), fields(kind = %T::KIND), err)]
    pub async fn find_all_by_organization_and_status(&self, organization_id: &str, status: &str) -> Result<Vec<T>> {
        Self::decode_all(
            self.store
                .find_all_by_organization_and_status(T::KIND, organization_id, status)
                .await?,
        )
    }

    #[instrument(skip(self), fields(kind = %T::KIND), err)]
    pub async fn find_all(&self) -> Result<Vec<T>> {
        Self::decode_all(self.store.find_all(T::KIND).await?)
    }

    #[instrument(skip(self, record), fields(kind = %T::KIND, id = %record.id()), err)]
    pub async fn save(&self, record: &T) -> Result<T> {
        let saved = self.store.save(Self::encode(record)?).await?;
        Self::decode(saved)
    }

    #[instrument(skip(self), fields(kind = %T::KIND), err)]
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.store.delete_by_id(T::KIND, id).await
    }
}
