//! OpenAPI documentation for the quality API at `/api/admin/quality/*`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;
use crate::db::models::{
    quality_tests::TestResult,
    testing_points::{Coordinates, PointStatus},
};
use crate::identity::{ExternalOrganization, ExternalUser};

/// Documents the trusted organization header set by the upstream gateway.
struct OrganizationHeaderAddon;

impl Modify for OrganizationHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "OrganizationHeader".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-organization-id",
                    "Organization on whose behalf the request is made. Set by the API gateway after authentication.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Water quality API",
        description = "Testing points, quality tests and daily records of a water utility organization."
    ),
    servers(
        (url = "/api/admin/quality", description = "Quality API server")
    ),
    modifiers(&OrganizationHeaderAddon),
    security(
        ("OrganizationHeader" = [])
    ),
    paths(
        api::handlers::testing_points::list_testing_points,
        api::handlers::testing_points::list_active_testing_points,
        api::handlers::testing_points::list_inactive_testing_points,
        api::handlers::testing_points::get_testing_point,
        api::handlers::testing_points::create_testing_point,
        api::handlers::testing_points::update_testing_point,
        api::handlers::testing_points::delete_testing_point,
        api::handlers::testing_points::activate_testing_point,
        api::handlers::testing_points::deactivate_testing_point,
        api::handlers::quality_tests::list_quality_tests,
        api::handlers::quality_tests::get_quality_test,
        api::handlers::quality_tests::create_quality_test,
        api::handlers::quality_tests::update_quality_test,
        api::handlers::quality_tests::delete_quality_test,
        api::handlers::quality_tests::physically_delete_quality_test,
        api::handlers::quality_tests::restore_quality_test,
        api::handlers::daily_records::list_daily_records,
        api::handlers::daily_records::get_daily_record,
        api::handlers::daily_records::create_daily_record,
        api::handlers::daily_records::update_daily_record,
        api::handlers::daily_records::delete_daily_record,
        api::handlers::daily_records::physically_delete_daily_record,
        api::handlers::daily_records::restore_daily_record,
    ),
    components(
        schemas(
            api::models::testing_points::TestingPointCreate,
            api::models::testing_points::TestingPointUpdate,
            api::models::testing_points::TestingPointResponse,
            api::models::testing_points::TestingPointEnriched,
            api::models::quality_tests::QualityTestRequest,
            api::models::quality_tests::QualityTestEnriched,
            api::models::daily_records::DailyRecordRequest,
            api::models::daily_records::DailyRecordEnriched,
            Coordinates,
            PointStatus,
            TestResult,
            ExternalOrganization,
            ExternalUser,
        )
    ),
    tags(
        (name = "sampling-points", description = "Testing points where water is sampled"),
        (name = "tests", description = "Laboratory quality tests over one or more testing points"),
        (name = "daily-records", description = "Daily field readings such as chlorine levels"),
    )
)]
pub struct QualityApiDoc;
