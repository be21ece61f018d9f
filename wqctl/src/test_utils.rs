//! Test utilities (available with the `test-utils` feature).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;

use crate::config::Config;
use crate::db::errors::{DbError, Result as DbResult};
use crate::db::models::{
    daily_records::DailyRecord,
    quality_tests::{DEFAULT_TEST_STATUS, QualityTest},
    testing_points::{Coordinates, PointStatus, TestingPoint},
};
use crate::db::{Document, InMemoryStore, RecordKind, RecordStore};
use crate::identity::{AdminDirectory, ExternalOrganization, ExternalUser};
use crate::types::new_record_id;
use crate::{AppState, build_router};

/// Organization id sent by [`create_test_app`] clients in the examples and tests.
pub const TEST_ORGANIZATION: &str = "org-1";

pub fn testing_point(organization_id: &str, point_code: &str) -> TestingPoint {
    let now = Utc::now();
    TestingPoint {
        id: new_record_id(),
        organization_id: organization_id.to_string(),
        point_code: point_code.to_string(),
        point_name: format!("Point {point_code}"),
        point_type: None,
        zone_id: None,
        location_description: None,
        street: None,
        coordinates: Some(Coordinates {
            latitude: -12.0464,
            longitude: -77.0428,
        }),
        status: PointStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn quality_test(organization_id: &str, test_code: &str, testing_point_ids: &[&str]) -> QualityTest {
    QualityTest {
        id: new_record_id(),
        organization_id: organization_id.to_string(),
        test_code: test_code.to_string(),
        testing_point_ids: testing_point_ids.iter().map(|id| id.to_string()).collect(),
        test_date: None,
        test_type: None,
        tested_by_user_id: None,
        weather_conditions: None,
        water_temperature: None,
        general_observations: None,
        status: DEFAULT_TEST_STATUS.to_string(),
        results: Vec::new(),
        created_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn daily_record(organization_id: &str, record_code: &str, testing_point_ids: &[&str]) -> DailyRecord {
    DailyRecord {
        id: new_record_id(),
        organization_id: organization_id.to_string(),
        record_code: record_code.to_string(),
        testing_point_ids: testing_point_ids.iter().map(|id| id.to_string()).collect(),
        record_date: None,
        level: None,
        acceptable: true,
        action_required: false,
        recorded_by_user_id: None,
        observations: None,
        amount: None,
        record_type: None,
        created_at: Utc::now(),
        deleted_at: None,
    }
}

/// An admin user of `organization_id`, with the organization embedded.
pub fn admin(user_id: &str, organization_id: &str) -> ExternalUser {
    ExternalUser {
        id: Some(user_id.to_string()),
        first_name: Some(format!("Admin {user_id}")),
        roles: vec!["ADMIN".to_string()],
        organization: Some(ExternalOrganization {
            organization_id: Some(organization_id.to_string()),
            organization_name: Some(format!("Organization {organization_id}")),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// In-process [`AdminDirectory`] with fixed contents.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    admins: HashMap<String, Vec<ExternalUser>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admins(mut self, organization_id: &str, admins: Vec<ExternalUser>) -> Self {
        self.admins.insert(organization_id.to_string(), admins);
        self
    }
}

#[async_trait]
impl AdminDirectory for StaticDirectory {
    async fn organization_admins(&self, organization_id: &str) -> Vec<ExternalUser> {
        self.admins.get(organization_id).cloned().unwrap_or_default()
    }

    async fn user_by_id(&self, user_id: &str) -> Option<ExternalUser> {
        self.admins.values().flatten().find(|user| user.has_id(user_id)).cloned()
    }
}

/// A directory whose identity service is down: every lookup comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDirectory;

#[async_trait]
impl AdminDirectory for UnavailableDirectory {
    async fn organization_admins(&self, _organization_id: &str) -> Vec<ExternalUser> {
        Vec::new()
    }

    async fn user_by_id(&self, _user_id: &str) -> Option<ExternalUser> {
        None
    }
}

/// Wraps a store and fails single-record lookups for chosen ids.
pub struct FlakyStore {
    inner: Arc<dyn RecordStore>,
    failing: HashSet<String>,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.failing.extend(ids);
        self
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn find_by_id(&self, kind: RecordKind, id: &str) -> DbResult<Option<Document>> {
        if self.failing.contains(id) {
            return Err(DbError::Other(anyhow::anyhow!("simulated lookup failure for {id}")));
        }
        self.inner.find_by_id(kind, id).await
    }

    async fn find_all_by_organization(&self, kind: RecordKind, organization_id: &str) -> DbResult<Vec<Document>> {
        self.inner.find_all_by_organization(kind, organization_id).await
    }

    async fn find_all_by_organization_and_status(
        &self,
        kind: RecordKind,
        organization_id: &str,
        status: &str,
    ) -> DbResult<Vec<Document>> {
        self.inner
            .find_all_by_organization_and_status(kind, organization_id, status)
            .await
    }

    async fn find_all(&self, kind: RecordKind) -> DbResult<Vec<Document>> {
        self.inner.find_all(kind).await
    }

    async fn save(&self, document: Document) -> DbResult<Document> {
        self.inner.save(document).await
    }

    async fn delete_by_id(&self, kind: RecordKind, id: &str) -> DbResult<()> {
        self.inner.delete_by_id(kind, id).await
    }

    async fn advance_sequence(&self, name: &str, floor: u32) -> DbResult<u32> {
        self.inner.advance_sequence(name, floor).await
    }
}

pub fn create_test_config() -> Config {
    Config {
        enable_metrics: false,
        ..Default::default()
    }
}

/// App state over an empty in-memory store and the given directory.
pub fn create_test_state(directory: Arc<dyn AdminDirectory>) -> AppState {
    AppState::builder()
        .config(create_test_config())
        .store(Arc::new(InMemoryStore::new()))
        .directory(directory)
        .build()
}

/// Header identifying `organization_id` as the caller, for `TestRequest::add_header`.
pub fn organization_header(organization_id: &str) -> (String, String) {
    (
        create_test_config().auth.organization_header,
        organization_id.to_string(),
    )
}

/// A test server whose identity service knows `u-1` as the admin of [`TEST_ORGANIZATION`].
pub fn create_test_app() -> (TestServer, AppState) {
    let directory = StaticDirectory::new().with_admins(TEST_ORGANIZATION, vec![admin("u-1", TEST_ORGANIZATION)]);
    create_test_app_with(Arc::new(directory))
}

pub fn create_test_app_with(directory: Arc<dyn AdminDirectory>) -> (TestServer, AppState) {
    let state = create_test_state(directory);
    let router = build_router(state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}
