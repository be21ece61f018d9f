//! Daily record lifecycle: create, update, soft delete, restore, hard delete.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::api::models::daily_records::{DailyRecordEnriched, DailyRecordRequest};
use crate::db::models::daily_records::DailyRecord;
use crate::db::{RecordStore, Records};
use crate::errors::{Error, Result};
use crate::identity::AdminDirectory;
use crate::services::codes::daily_record_code;
use crate::services::enrichment::Enricher;
use crate::types::new_record_id;

const RESOURCE: &str = "DailyRecord";

#[derive(Clone)]
pub struct DailyRecordService {
    records: Records<DailyRecord>,
    enricher: Enricher,
}

impl DailyRecordService {
    pub fn new(store: Arc<dyn RecordStore>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self {
            records: Records::new(store.clone()),
            enricher: Enricher::new(store, directory),
        }
    }

    async fn load(&self, organization_id: &str, id: &str) -> Result<DailyRecord> {
        self.records
            .find_by_id_in_organization(id, organization_id)
            .await?
            .ok_or_else(|| Error::not_found(RESOURCE, id))
    }

    #[instrument(skip(self), err)]
    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<DailyRecordEnriched>> {
        let records = self.records.find_all_by_organization(organization_id).await?;
        Ok(self.enricher.daily_records(records).await)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> Result<DailyRecordEnriched> {
        let record = self.load(organization_id, id).await?;
        Ok(self.enricher.daily_record(record).await)
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&self, organization_id: &str, request: DailyRecordRequest) -> Result<DailyRecordEnriched> {
        let now = Utc::now();
        let record_code = request
            .record_code
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| daily_record_code(request.record_type.as_deref(), now));

        let record = DailyRecord {
            id: new_record_id(),
            organization_id: organization_id.to_string(),
            record_code,
            testing_point_ids: request.testing_point_ids,
            record_date: request.record_date,
            level: request.level,
            acceptable: request.acceptable,
            action_required: request.action_required,
            recorded_by_user_id: request.recorded_by_user_id,
            observations: request.observations,
            amount: request.amount,
            record_type: request.record_type,
            created_at: now,
            deleted_at: None,
        };

        let saved = self.records.save(&record).await?;
        debug!(record_code = %saved.record_code, "Created daily record");
        Ok(self.enricher.daily_record(saved).await)
    }

    /// Replace every field of a record. The code is kept when none is supplied.
    #[instrument(skip(self, request), err)]
    pub async fn update(&self, organization_id: &str, id: &str, request: DailyRecordRequest) -> Result<DailyRecordEnriched> {
        let mut record = self.load(organization_id, id).await?;

        if let Some(code) = request.record_code.filter(|code| !code.trim().is_empty()) {
            record.record_code = code;
        }
        record.testing_point_ids = request.testing_point_ids;
        record.record_date = request.record_date;
        record.level = request.level;
        record.acceptable = request.acceptable;
        record.action_required = request.action_required;
        record.recorded_by_user_id = request.recorded_by_user_id;
        record.observations = request.observations;
        record.amount = request.amount;
        record.record_type = request.record_type;

        let saved = self.records.save(&record).await?;
        Ok(self.enricher.daily_record(saved).await)
    }

    #[instrument(skip(self), err)]
    pub async fn soft_delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let mut record = self.load(organization_id, id).await?;
        record.deleted_at = Some(Utc::now());
        self.records.save(&record).await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn restore(&self, organization_id: &str, id: &str) -> Result<DailyRecordEnriched> {
        let mut record = self.load(organization_id, id).await?;
        record.deleted_at = None;
        let saved = self.records.save(&record).await?;
        Ok(self.enricher.daily_record(saved).await)
    }

    /// Permanently remove a record.
    ///
    /// Succeeds whether or not the record exists. Records owned by another organization are
    /// left untouched.
    #[instrument(skip(self), err)]
    pub async fn hard_delete(&self, organization_id: &str, id: &str) -> Result<()> {
        match self.records.find_by_id(id).await? {
            Some(record) if record.organization_id != organization_id => {
                debug!("Daily record belongs to another organization, not deleting");
            }
            _ => self.records.delete_by_id(id).await?,
        }
        Ok(())
    }
}
