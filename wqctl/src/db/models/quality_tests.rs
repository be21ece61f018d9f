use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::store::{Record, RecordKind};
use crate::types::{OrganizationId, QualityTestId, TestingPointId, UserId};

/// Status given to a quality test when it is first recorded
pub const DEFAULT_TEST_STATUS: &str = "COMPLETED";

/// One measured parameter within a quality test.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub parameter_id: Option<String>,
    pub parameter_code: Option<String>,
    pub measured_value: Option<f64>,
    pub unit: Option<String>,
    pub status: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTest {
    pub id: QualityTestId,
    pub organization_id: OrganizationId,
    pub test_code: String,
    pub testing_point_ids: Vec<TestingPointId>,
    pub test_date: Option<DateTime<Utc>>,
    pub test_type: Option<String>,
    pub tested_by_user_id: Option<UserId>,
    pub weather_conditions: Option<String>,
    pub water_temperature: Option<f64>,
    pub general_observations: Option<String>,
    pub status: String,
    pub results: Vec<TestResult>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record for QualityTest {
    const KIND: RecordKind = RecordKind::QualityTest;

    fn id(&self) -> &str {
        &self.id
    }

    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn status(&self) -> Option<String> {
        Some(self.status.clone())
    }
}
