//! Composes stored records with the data they reference.
//!
//! A quality test or daily record names its testing points by id and its owner by user id.
//! Enriching one resolves both concurrently: the owner is picked out of the organization's admin
//! list from the identity service while every testing point is loaded from the store. Both sides
//! are joined before the view is built.
//!
//! Nothing here fails. A testing point that is missing or cannot be loaded is left out of the
//! view, and the owner falls back to a placeholder when the identity service has no match. All
//! lookups are plain futures joined in place, so dropping the request cancels them.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::api::models::daily_records::DailyRecordEnriched;
use crate::api::models::quality_tests::QualityTestEnriched;
use crate::api::models::testing_points::{TestingPointEnriched, TestingPointResponse};
use crate::db::models::{daily_records::DailyRecord, quality_tests::QualityTest, testing_points::TestingPoint};
use crate::db::{Records, RecordStore};
use crate::identity::{AdminDirectory, ExternalUser};
use crate::types::{TestingPointId, abbrev_id};

#[derive(Clone)]
pub struct Enricher {
    directory: Arc<dyn AdminDirectory>,
    testing_points: Records<TestingPoint>,
}

impl Enricher {
    pub fn new(store: Arc<dyn RecordStore>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self {
            directory,
            testing_points: Records::new(store),
        }
    }

    /// The admin of `organization_id` whose id is `user_id`, or the placeholder user.
    async fn owner(&self, organization_id: &str, user_id: Option<&str>) -> ExternalUser {
        let admins = self.directory.organization_admins(organization_id).await;
        user_id
            .and_then(|user_id| admins.into_iter().find(|admin| admin.has_id(user_id)))
            .unwrap_or_default()
    }

    async fn resolve_testing_point(&self, id: &str) -> Option<TestingPointResponse> {
        match self.testing_points.find_by_id(id).await {
            Ok(Some(point)) => Some(point.into()),
            Ok(None) => {
                debug!(testing_point_id = %abbrev_id(id), "Referenced testing point not found, skipping");
                None
            }
            Err(e) => {
                warn!(testing_point_id = %abbrev_id(id), error = %e, "Failed to load referenced testing point, skipping");
                None
            }
        }
    }

    /// Load every referenced testing point concurrently, keeping the order of `ids` for those
    /// that resolve.
    pub async fn resolve_testing_points(&self, ids: &[TestingPointId]) -> Vec<TestingPointResponse> {
        join_all(ids.iter().map(|id| self.resolve_testing_point(id)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    #[instrument(skip_all, fields(testing_point_id = %point.id))]
    pub async fn testing_point(&self, point: TestingPoint) -> TestingPointEnriched {
        let organization = self.directory.organization(&point.organization_id).await;
        if organization.is_none() {
            debug!("No organization found for testing point");
        }
        TestingPointEnriched::new(point, organization)
    }

    pub async fn testing_points(&self, points: Vec<TestingPoint>) -> Vec<TestingPointEnriched> {
        join_all(points.into_iter().map(|point| self.testing_point(point))).await
    }

    #[instrument(skip_all, fields(quality_test_id = %test.id))]
    pub async fn quality_test(&self, test: QualityTest) -> QualityTestEnriched {
        let (tested_by_user, testing_points) = tokio::join!(
            self.owner(&test.organization_id, test.tested_by_user_id.as_deref()),
            self.resolve_testing_points(&test.testing_point_ids),
        );
        QualityTestEnriched::new(test, testing_points, tested_by_user)
    }

    pub async fn quality_tests(&self, tests: Vec<QualityTest>) -> Vec<QualityTestEnriched> {
        join_all(tests.into_iter().map(|test| self.quality_test(test))).await
    }

    #[instrument(skip_all, fields(daily_record_id = %record.id))]
    pub async fn daily_record(&self, record: DailyRecord) -> DailyRecordEnriched {
        let (recorded_by_user, testing_points) = tokio::join!(
            self.owner(&record.organization_id, record.recorded_by_user_id.as_deref()),
            self.resolve_testing_points(&record.testing_point_ids),
        );
        DailyRecordEnriched::new(record, testing_points, recorded_by_user)
    }

    pub async fn daily_records(&self, records: Vec<DailyRecord>) -> Vec<DailyRecordEnriched> {
        join_all(records.into_iter().map(|record| self.daily_record(record))).await
    }
}
