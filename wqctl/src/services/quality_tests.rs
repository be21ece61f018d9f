//! Quality test lifecycle: create, update, soft delete, restore, hard delete.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::api::models::quality_tests::{QualityTestEnriched, QualityTestRequest};
use crate::db::models::quality_tests::{DEFAULT_TEST_STATUS, QualityTest};
use crate::db::{RecordStore, Records};
use crate::errors::{Error, Result};
use crate::identity::AdminDirectory;
use crate::services::codes::CodeGenerator;
use crate::services::enrichment::Enricher;
use crate::types::new_record_id;

const RESOURCE: &str = "QualityTest";

#[derive(Clone)]
pub struct QualityTestService {
    tests: Records<QualityTest>,
    codes: CodeGenerator,
    enricher: Enricher,
}

impl QualityTestService {
    pub fn new(store: Arc<dyn RecordStore>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self {
            tests: Records::new(store.clone()),
            codes: CodeGenerator::new(store.clone()),
            enricher: Enricher::new(store, directory),
        }
    }

    async fn load(&self, organization_id: &str, id: &str) -> Result<QualityTest> {
        self.tests
            .find_by_id_in_organization(id, organization_id)
            .await?
            .ok_or_else(|| Error::not_found(RESOURCE, id))
    }

    /// All tests of the organization, soft-deleted ones included.
    #[instrument(skip(self), err)]
    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<QualityTestEnriched>> {
        let tests = self.tests.find_all_by_organization(organization_id).await?;
        Ok(self.enricher.quality_tests(tests).await)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> Result<QualityTestEnriched> {
        let test = self.load(organization_id, id).await?;
        Ok(self.enricher.quality_test(test).await)
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&self, organization_id: &str, request: QualityTestRequest) -> Result<QualityTestEnriched> {
        let test_code = self.codes.next_test_code().await?;

        let test = QualityTest {
            id: new_record_id(),
            organization_id: organization_id.to_string(),
            test_code,
            testing_point_ids: request.testing_point_ids,
            test_date: request.test_date,
            test_type: request.test_type,
            tested_by_user_id: request.tested_by_user_id,
            weather_conditions: request.weather_conditions,
            water_temperature: request.water_temperature,
            general_observations: request.general_observations,
            status: DEFAULT_TEST_STATUS.to_string(),
            results: request.results,
            created_at: Utc::now(),
            deleted_at: None,
        };

        let saved = self.tests.save(&test).await?;
        Ok(self.enricher.quality_test(saved).await)
    }

    /// Replace a test's contents. The test is given a freshly generated code.
    #[instrument(skip(self, request), err)]
    pub async fn update(&self, organization_id: &str, id: &str, request: QualityTestRequest) -> Result<QualityTestEnriched> {
        let mut test = self.load(organization_id, id).await?;

        test.test_code = self.codes.next_test_code().await?;
        test.testing_point_ids = request.testing_point_ids;
        test.test_date = request.test_date;
        test.test_type = request.test_type;
        test.tested_by_user_id = request.tested_by_user_id;
        test.weather_conditions = request.weather_conditions;
        test.water_temperature = request.water_temperature;
        test.general_observations = request.general_observations;
        if let Some(status) = request.status.filter(|s| !s.trim().is_empty()) {
            test.status = status;
        }
        test.results = request.results;

        let saved = self.tests.save(&test).await?;
        Ok(self.enricher.quality_test(saved).await)
    }

    #[instrument(skip(self), err)]
    pub async fn soft_delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let mut test = self.load(organization_id, id).await?;
        test.deleted_at = Some(Utc::now());
        self.tests.save(&test).await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn restore(&self, organization_id: &str, id: &str) -> Result<QualityTestEnriched> {
        let mut test = self.load(organization_id, id).await?;
        test.deleted_at = None;
        let saved = self.tests.save(&test).await?;
        Ok(self.enricher.quality_test(saved).await)
    }

    #[instrument(skip(self), err)]
    pub async fn hard_delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let test = self.load(organization_id, id).await?;
        self.tests.delete_by_id(&test.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::db::models::quality_tests::TestResult;
    use crate::db::models::testing_points::TestingPoint;
    use crate::test_utils::{StaticDirectory, admin, testing_point};

    struct Fixture {
        service: QualityTestService,
        point: TestingPoint,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let point = testing_point("org-1", "PM001");
        Records::<TestingPoint>::new(store.clone()).save(&point).await.unwrap();

        let directory = StaticDirectory::new().with_admins("org-1", vec![admin("u-1", "org-1")]);
        Fixture {
            service: QualityTestService::new(store, Arc::new(directory)),
            point,
        }
    }

    fn request(point_ids: &[&str]) -> QualityTestRequest {
        QualityTestRequest {
            testing_point_ids: point_ids.iter().map(|id| id.to_string()).collect(),
            test_type: Some("RUTINARIO".to_string()),
            tested_by_user_id: Some("u-1".to_string()),
            water_temperature: Some(18.5),
            results: vec![TestResult {
                parameter_code: Some("CLORO".to_string()),
                measured_value: Some(0.8),
                unit: Some("mg/L".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_create_assigns_code_and_status() {
        let Fixture { service, point } = fixture().await;

        let mut with_status = request(&[point.id.as_str()]);
        with_status.status = Some("PENDING".to_string());
        let first = service.create("org-1", with_status).await.unwrap();
        let second = service.create("org-1", request(&[])).await.unwrap();

        assert_eq!(first.test_code, "ANL001");
        assert_eq!(second.test_code, "ANL002");
        assert_eq!(first.status, DEFAULT_TEST_STATUS);
        assert_eq!(first.testing_points.len(), 1);
        assert_eq!(first.testing_points[0].id, point.id);
        assert!(first.tested_by_user.has_id("u-1"));
        assert!(first.organization.is_some());
        assert_eq!(first.results.len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_soft_delete_then_restore_round_trips() {
        let Fixture { service, point } = fixture().await;
        let created = service.create("org-1", request(&[point.id.as_str()])).await.unwrap();

        service.soft_delete("org-1", &created.id).await.unwrap();
        let deleted = service.get_by_id("org-1", &created.id).await.unwrap();
        assert!(deleted.deleted_at.is_some());
        // soft-deleted tests stay listed
        assert_eq!(service.get_all("org-1").await.unwrap().len(), 1);

        let restored = service.restore("org-1", &created.id).await.unwrap();
        assert_eq!(restored, created);

        // restoring a live test changes nothing
        assert_eq!(service.restore("org-1", &created.id).await.unwrap(), created);
    }

    #[test_log::test(tokio::test)]
    async fn test_hard_delete() {
        let Fixture { service, .. } = fixture().await;
        let created = service.create("org-1", request(&[])).await.unwrap();

        service.hard_delete("org-1", &created.id).await.unwrap();

        assert!(matches!(
            service.get_by_id("org-1", &created.id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            service.hard_delete("org-1", &created.id).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_and_foreign_tests_are_not_found() {
        let Fixture { service, .. } = fixture().await;
        let created = service.create("org-1", request(&[])).await.unwrap();

        for result in [
            service.get_by_id("org-1", "missing").await.map(|_| ()),
            service.get_by_id("org-2", &created.id).await.map(|_| ()),
            service.soft_delete("org-2", &created.id).await,
            service.restore("org-1", "missing").await.map(|_| ()),
            service.update("org-1", "missing", request(&[])).await.map(|_| ()),
        ] {
            assert!(matches!(result, Err(Error::NotFound { .. })));
        }
        assert!(service.get_all("org-2").await.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_update_regenerates_code_and_keeps_status() {
        let Fixture { service, point } = fixture().await;
        let created = service.create("org-1", request(&[])).await.unwrap();

        let mut changes = request(&[point.id.as_str(), "gone"]);
        changes.general_observations = Some("Turbid sample".to_string());
        changes.results = vec![];
        let updated = service.update("org-1", &created.id, changes).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.test_code, "ANL002");
        assert_eq!(updated.status, DEFAULT_TEST_STATUS);
        assert_eq!(updated.general_observations.as_deref(), Some("Turbid sample"));
        assert!(updated.results.is_empty());
        assert_eq!(updated.testing_points.len(), 1);

        let mut status_change = request(&[]);
        status_change.status = Some("REVIEWED".to_string());
        let reviewed = service.update("org-1", &created.id, status_change).await.unwrap();
        assert_eq!(reviewed.status, "REVIEWED");
    }
}
