//! Testing point lifecycle: create, update, activate/deactivate, hard delete.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::api::models::testing_points::{TestingPointCreate, TestingPointEnriched, TestingPointResponse, TestingPointUpdate};
use crate::db::models::testing_points::{Coordinates, PointStatus, TestingPoint};
use crate::db::{RecordStore, Records};
use crate::errors::{Error, Result};
use crate::identity::AdminDirectory;
use crate::services::codes::CodeGenerator;
use crate::services::enrichment::Enricher;
use crate::types::new_record_id;

const RESOURCE: &str = "TestingPoint";

fn validate_point_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "pointName cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_coordinates(coordinates: &Coordinates) -> Result<()> {
    if !coordinates.is_valid() {
        return Err(Error::BadRequest {
            message: format!(
                "coordinates out of range: latitude {} must be within [-90, 90] and longitude {} within [-180, 180]",
                coordinates.latitude, coordinates.longitude
            ),
        });
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct TestingPointService {
    points: Records<TestingPoint>,
    codes: CodeGenerator,
    enricher: Enricher,
}

impl TestingPointService {
    pub fn new(store: Arc<dyn RecordStore>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self {
            points: Records::new(store.clone()),
            codes: CodeGenerator::new(store.clone()),
            enricher: Enricher::new(store, directory),
        }
    }

    async fn load(&self, organization_id: &str, id: &str) -> Result<TestingPoint> {
        self.points
            .find_by_id_in_organization(id, organization_id)
            .await?
            .ok_or_else(|| Error::not_found(RESOURCE, id))
    }

    #[instrument(skip(self), err)]
    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<TestingPointEnriched>> {
        let points = self.points.find_all_by_organization(organization_id).await?;
        Ok(self.enricher.testing_points(points).await)
    }

    #[instrument(skip(self), err)]
    pub async fn get_all_by_status(&self, organization_id: &str, status: PointStatus) -> Result<Vec<TestingPointEnriched>> {
        let points = self
            .points
            .find_all_by_organization_and_status(organization_id, status.as_str())
            .await?;
        Ok(self.enricher.testing_points(points).await)
    }

    pub async fn get_all_active(&self, organization_id: &str) -> Result<Vec<TestingPointEnriched>> {
        self.get_all_by_status(organization_id, PointStatus::Active).await
    }

    pub async fn get_all_inactive(&self, organization_id: &str) -> Result<Vec<TestingPointEnriched>> {
        self.get_all_by_status(organization_id, PointStatus::Inactive).await
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> Result<TestingPointEnriched> {
        let point = self.load(organization_id, id).await?;
        Ok(self.enricher.testing_point(point).await)
    }

    #[instrument(skip(self, request), fields(point_name = %request.point_name), err)]
    pub async fn create(&self, organization_id: &str, request: TestingPointCreate) -> Result<TestingPointResponse> {
        validate_point_name(&request.point_name)?;
        validate_coordinates(&request.coordinates)?;

        let point_code = match non_blank(request.point_code) {
            Some(code) => code,
            None => self.codes.next_point_code(request.point_type.as_ref()).await?,
        };

        let now = Utc::now();
        let point = TestingPoint {
            id: new_record_id(),
            organization_id: organization_id.to_string(),
            point_code,
            point_name: request.point_name,
            point_type: request.point_type,
            zone_id: request.zone_id,
            location_description: request.location_description,
            street: request.street,
            coordinates: Some(request.coordinates),
            status: PointStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let saved = self.points.save(&point).await?;
        debug!(point_code = %saved.point_code, "Created testing point");
        Ok(saved.into())
    }

    #[instrument(skip(self, request), err)]
    pub async fn update(&self, organization_id: &str, id: &str, request: TestingPointUpdate) -> Result<TestingPointResponse> {
        validate_point_name(&request.point_name)?;
        if let Some(coordinates) = &request.coordinates {
            validate_coordinates(coordinates)?;
        }

        let mut point = self.load(organization_id, id).await?;

        if let Some(code) = non_blank(request.point_code) {
            point.point_code = code;
        }
        point.point_name = request.point_name;
        point.point_type = request.point_type;
        point.zone_id = request.zone_id;
        point.location_description = request.location_description;
        point.street = request.street;
        if let Some(coordinates) = request.coordinates {
            point.coordinates = Some(coordinates);
        }
        if let Some(status) = request.status {
            point.status = status;
        }
        point.updated_at = Utc::now();

        Ok(self.points.save(&point).await?.into())
    }

    /// Permanently remove a testing point.
    ///
    /// Succeeds whether or not the point exists. Points owned by another organization are left
    /// untouched.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<()> {
        match self.points.find_by_id(id).await? {
            Some(point) if point.organization_id != organization_id => {
                debug!("Testing point belongs to another organization, not deleting");
            }
            _ => self.points.delete_by_id(id).await?,
        }
        Ok(())
    }

    async fn set_status(&self, organization_id: &str, id: &str, status: PointStatus) -> Result<TestingPointEnriched> {
        let mut point = self.load(organization_id, id).await?;
        point.status = status;
        let saved = self.points.save(&point).await?;
        Ok(self.enricher.testing_point(saved).await)
    }

    #[instrument(skip(self), err)]
    pub async fn activate(&self, organization_id: &str, id: &str) -> Result<TestingPointEnriched> {
        self.set_status(organization_id, id, PointStatus::Active).await
    }

    #[instrument(skip(self), err)]
    pub async fn deactivate(&self, organization_id: &str, id: &str) -> Result<TestingPointEnriched> {
        self.set_status(organization_id, id, PointStatus::Inactive).await
    }
}
