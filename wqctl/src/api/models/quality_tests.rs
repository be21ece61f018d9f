use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::testing_points::TestingPointResponse;
use crate::db::models::quality_tests::{QualityTest, TestResult};
use crate::identity::{ExternalOrganization, ExternalUser};
use crate::types::{QualityTestId, TestingPointId, UserId};

/// Body for `POST /tests` and `PUT /tests/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityTestRequest {
    /// Testing points sampled by this test, in order
    #[serde(alias = "testingPointId")]
    pub testing_point_ids: Vec<TestingPointId>,
    pub test_date: Option<DateTime<Utc>>,
    pub test_type: Option<String>,
    pub tested_by_user_id: Option<UserId>,
    pub weather_conditions: Option<String>,
    pub water_temperature: Option<f64>,
    pub general_observations: Option<String>,
    /// Ignored on create, where the status is always `COMPLETED`
    pub status: Option<String>,
    pub results: Vec<TestResult>,
}

/// A quality test with its testing points and tester resolved.
///
/// Testing points that could not be loaded are left out; `testedByUser` is an all-null
/// placeholder when the tester is not among the organization's admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityTestEnriched {
    pub id: QualityTestId,
    pub test_code: String,
    pub testing_points: Vec<TestingPointResponse>,
    pub test_date: Option<DateTime<Utc>>,
    pub test_type: Option<String>,
    pub weather_conditions: Option<String>,
    pub water_temperature: Option<f64>,
    pub general_observations: Option<String>,
    pub status: String,
    pub results: Vec<TestResult>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub organization: Option<ExternalOrganization>,
    pub tested_by_user: ExternalUser,
}

impl QualityTestEnriched {
    pub fn new(test: QualityTest, testing_points: Vec<TestingPointResponse>, tested_by_user: ExternalUser) -> Self {
        Self {
            id: test.id,
            test_code: test.test_code,
            testing_points,
            test_date: test.test_date,
            test_type: test.test_type,
            weather_conditions: test.weather_conditions,
            water_temperature: test.water_temperature,
            general_observations: test.general_observations,
            status: test.status,
            results: test.results,
            created_at: test.created_at,
            deleted_at: test.deleted_at,
            organization: tested_by_user.organization.clone(),
            tested_by_user,
        }
    }
}
