//! Testing points: the physical places where water is sampled.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::store::{Record, RecordKind};
use crate::types::{OrganizationId, TestingPointId};

/// Kind of place a testing point samples.
///
/// Unknown values are kept verbatim so that records written by other clients survive a
/// round trip. Matching is case-insensitive and accepts the English names as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PointType {
    Reservoir,
    DistributionNetwork,
    Household,
    Other(String),
}

impl From<String> for PointType {
    fn from(value: String) -> Self {
        match value.trim().to_uppercase().as_str() {
            "RESERVORIO" | "RESERVOIR" => PointType::Reservoir,
            "RED_DISTRIBUCION" | "DISTRIBUTION_NETWORK" => PointType::DistributionNetwork,
            "DOMICILIO" | "HOUSEHOLD" => PointType::Household,
            _ => PointType::Other(value),
        }
    }
}

impl From<PointType> for String {
    fn from(value: PointType) -> Self {
        match value {
            PointType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl PointType {
    pub fn as_str(&self) -> &str {
        match self {
            PointType::Reservoir => "RESERVORIO",
            PointType::DistributionNetwork => "RED_DISTRIBUCION",
            PointType::Household => "DOMICILIO",
            PointType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointStatus {
    Active,
    Inactive,
}

impl PointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointStatus::Active => "ACTIVE",
            PointStatus::Inactive => "INACTIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingPoint {
    pub id: TestingPointId,
    pub organization_id: OrganizationId,
    pub point_code: String,
    pub point_name: String,
    pub point_type: Option<PointType>,
    pub zone_id: Option<String>,
    pub location_description: Option<String>,
    pub street: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub status: PointStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for TestingPoint {
    const KIND: RecordKind = RecordKind::TestingPoint;

    fn id(&self) -> &str {
        &self.id
    }

    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn status(&self) -> Option<String> {
        Some(self.status.as_str().to_string())
    }
}
