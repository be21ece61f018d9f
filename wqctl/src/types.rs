//! Common type definitions.
//!
//! Entity ids are opaque strings. Ids minted by this service are UUID v4 strings, but records
//! and references created elsewhere (the identity service's user and organization ids, for
//! instance) use their own formats, so nothing here assumes a UUID.
//!
//! - [`OrganizationId`]: owning organization, as issued by the identity service
//! - [`UserId`]: identity-service user
//! - [`TestingPointId`], [`QualityTestId`], [`DailyRecordId`]: local records

use uuid::Uuid;

pub type OrganizationId = String;
pub type UserId = String;
pub type TestingPointId = String;
pub type QualityTestId = String;
pub type DailyRecordId = String;

/// Mint a fresh record id
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Abbreviate an id to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_id(id: &str) -> String {
    id.chars().take(8).collect()
}
