use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::testing_points::{Coordinates, PointStatus, PointType, TestingPoint};
use crate::identity::ExternalOrganization;
use crate::types::{OrganizationId, TestingPointId};

/// Body for `POST /sampling-points`.
///
/// The owning organization comes from the request context; an `organizationId` in the body
/// is ignored. The status of a new point is always `ACTIVE`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestingPointCreate {
    /// Explicit code; generated from the point type when blank or absent
    #[serde(default)]
    pub point_code: Option<String>,
    pub point_name: String,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "DOMICILIO")]
    pub point_type: Option<PointType>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub location_description: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    pub coordinates: Coordinates,
}

/// Body for `PUT /sampling-points/{id}`.
///
/// Replaces the descriptive fields. Code, coordinates and status are only replaced when
/// supplied.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestingPointUpdate {
    #[serde(default)]
    pub point_code: Option<String>,
    pub point_name: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub point_type: Option<PointType>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub location_description: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub status: Option<PointStatus>,
}

/// A stored testing point, as returned by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestingPointResponse {
    pub id: TestingPointId,
    pub organization_id: OrganizationId,
    pub point_code: String,
    pub point_name: String,
    #[schema(value_type = Option<String>)]
    pub point_type: Option<PointType>,
    pub zone_id: Option<String>,
    pub location_description: Option<String>,
    pub street: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub status: PointStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TestingPoint> for TestingPointResponse {
    fn from(point: TestingPoint) -> Self {
        Self {
            id: point.id,
            organization_id: point.organization_id,
            point_code: point.point_code,
            point_name: point.point_name,
            point_type: point.point_type,
            zone_id: point.zone_id,
            location_description: point.location_description,
            street: point.street,
            coordinates: point.coordinates,
            status: point.status,
            created_at: point.created_at,
            updated_at: point.updated_at,
        }
    }
}

/// A testing point with its owning organization resolved from the identity service.
///
/// `organization` is `null` when the identity service has nothing for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestingPointEnriched {
    pub id: TestingPointId,
    pub point_code: String,
    pub point_name: String,
    #[schema(value_type = Option<String>)]
    pub point_type: Option<PointType>,
    pub zone_id: Option<String>,
    pub location_description: Option<String>,
    pub street: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub status: PointStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub organization: Option<ExternalOrganization>,
}

impl TestingPointEnriched {
    pub fn new(point: TestingPoint, organization: Option<ExternalOrganization>) -> Self {
        Self {
            id: point.id,
            point_code: point.point_code,
            point_name: point.point_name,
            point_type: point.point_type,
            zone_id: point.zone_id,
            location_description: point.location_description,
            street: point.street,
            coordinates: point.coordinates,
            status: point.status,
            created_at: point.created_at,
            updated_at: point.updated_at,
            organization,
        }
    }
}
