use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::testing_points::TestingPointResponse;
use crate::db::models::daily_records::DailyRecord;
use crate::identity::{ExternalOrganization, ExternalUser};
use crate::types::{DailyRecordId, TestingPointId, UserId};

/// Body for `POST /daily-records` and `PUT /daily-records/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyRecordRequest {
    /// Explicit code; on create a time-based code is generated when blank or absent
    pub record_code: Option<String>,
    pub testing_point_ids: Vec<TestingPointId>,
    pub record_date: Option<NaiveDate>,
    pub level: Option<f64>,
    pub acceptable: bool,
    pub action_required: bool,
    pub recorded_by_user_id: Option<UserId>,
    pub observations: Option<String>,
    pub amount: Option<f64>,
    #[schema(example = "CLORO")]
    pub record_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecordEnriched {
    pub id: DailyRecordId,
    pub record_code: String,
    pub testing_points: Vec<TestingPointResponse>,
    pub record_date: Option<NaiveDate>,
    pub level: Option<f64>,
    pub acceptable: bool,
    pub action_required: bool,
    pub observations: Option<String>,
    pub amount: Option<f64>,
    pub record_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub organization: Option<ExternalOrganization>,
    pub recorded_by_user: ExternalUser,
}

impl DailyRecordEnriched {
    pub fn new(record: DailyRecord, testing_points: Vec<TestingPointResponse>, recorded_by_user: ExternalUser) -> Self {
        Self {
            id: record.id,
            record_code: record.record_code,
            testing_points,
            record_date: record.record_date,
            level: record.level,
            acceptable: record.acceptable,
            action_required: record.action_required,
            observations: record.observations,
            amount: record.amount,
            record_type: record.record_type,
            created_at: record.created_at,
            deleted_at: record.deleted_at,
            organization: recorded_by_user.organization.clone(),
            recorded_by_user,
        }
    }
}
