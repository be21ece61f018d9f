use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::store::{Record, RecordKind};
use crate::types::{DailyRecordId, OrganizationId, TestingPointId, UserId};

/// A daily operational reading (chlorine dosing, sulfate, ...) across one or more testing points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: DailyRecordId,
    pub organization_id: OrganizationId,
    pub record_code: String,
    pub testing_point_ids: Vec<TestingPointId>,
    pub record_date: Option<NaiveDate>,
    pub level: Option<f64>,
    pub acceptable: bool,
    pub action_required: bool,
    pub recorded_by_user_id: Option<UserId>,
    pub observations: Option<String>,
    pub amount: Option<f64>,
    pub record_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record for DailyRecord {
    const KIND: RecordKind = RecordKind::DailyRecord;

    fn id(&self) -> &str {
        &self.id
    }

    fn organization_id(&self) -> &str {
        &self.organization_id
    }
}
