use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        extractors::JsonBody,
        models::{
            envelope::ApiResponse,
            testing_points::{TestingPointCreate, TestingPointEnriched, TestingPointResponse, TestingPointUpdate},
        },
    },
    auth::OrganizationContext,
    errors::Result,
    types::TestingPointId,
};

#[utoipa::path(
    get,
    path = "/sampling-points",
    tag = "sampling-points",
    summary = "List testing points",
    responses(
        (status = 200, description = "Testing points of the caller's organization", body = ApiResponse<Vec<TestingPointEnriched>>),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_testing_points(
    State(state): State<AppState>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<Vec<TestingPointEnriched>>>> {
    let points = state.testing_points().get_all(&context.organization_id).await?;
    Ok(Json(ApiResponse::ok(points)))
}

#[utoipa::path(
    get,
    path = "/sampling-points/active",
    tag = "sampling-points",
    summary = "List active testing points",
    responses(
        (status = 200, description = "Active testing points", body = ApiResponse<Vec<TestingPointEnriched>>),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_active_testing_points(
    State(state): State<AppState>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<Vec<TestingPointEnriched>>>> {
    let points = state.testing_points().get_all_active(&context.organization_id).await?;
    Ok(Json(ApiResponse::ok(points)))
}

#[utoipa::path(
    get,
    path = "/sampling-points/inactive",
    tag = "sampling-points",
    summary = "List inactive testing points",
    responses(
        (status = 200, description = "Inactive testing points", body = ApiResponse<Vec<TestingPointEnriched>>),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_inactive_testing_points(
    State(state): State<AppState>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<Vec<TestingPointEnriched>>>> {
    let points = state.testing_points().get_all_inactive(&context.organization_id).await?;
    Ok(Json(ApiResponse::ok(points)))
}

#[utoipa::path(
    get,
    path = "/sampling-points/{id}",
    tag = "sampling-points",
    summary = "Get testing point",
    responses(
        (status = 200, description = "Testing point details", body = ApiResponse<TestingPointEnriched>),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Testing point not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Testing point ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_testing_point(
    State(state): State<AppState>,
    Path(id): Path<TestingPointId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<TestingPointEnriched>>> {
    let point = state.testing_points().get_by_id(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::ok(point)))
}

#[utoipa::path(
    post,
    path = "/sampling-points",
    tag = "sampling-points",
    summary = "Create testing point",
    request_body = TestingPointCreate,
    responses(
        (status = 201, description = "Testing point created", body = ApiResponse<TestingPointResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_testing_point(
    State(state): State<AppState>,
    context: OrganizationContext,
    JsonBody(create): JsonBody<TestingPointCreate>,
) -> Result<(StatusCode, Json<ApiResponse<TestingPointResponse>>)> {
    let point = state.testing_points().create(&context.organization_id, create).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(point))))
}

#[utoipa::path(
    put,
    path = "/sampling-points/{id}",
    tag = "sampling-points",
    summary = "Update testing point",
    request_body = TestingPointUpdate,
    responses(
        (status = 200, description = "Testing point updated", body = ApiResponse<TestingPointResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Testing point not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Testing point ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_testing_point(
    State(state): State<AppState>,
    Path(id): Path<TestingPointId>,
    context: OrganizationContext,
    JsonBody(update): JsonBody<TestingPointUpdate>,
) -> Result<Json<ApiResponse<TestingPointResponse>>> {
    let point = state.testing_points().update(&context.organization_id, &id, update).await?;
    Ok(Json(ApiResponse::ok(point)))
}

#[utoipa::path(
    delete,
    path = "/sampling-points/{id}",
    tag = "sampling-points",
    summary = "Delete testing point",
    description = "Removes the testing point permanently. Deleting an unknown ID succeeds.",
    responses(
        (status = 200, description = "Testing point deleted"),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Testing point ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_testing_point(
    State(state): State<AppState>,
    Path(id): Path<TestingPointId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<()>>> {
    state.testing_points().delete(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::empty()))
}

#[utoipa::path(
    patch,
    path = "/sampling-points/activate/{id}",
    tag = "sampling-points",
    summary = "Activate testing point",
    responses(
        (status = 200, description = "Testing point activated", body = ApiResponse<TestingPointEnriched>),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Testing point not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Testing point ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn activate_testing_point(
    State(state): State<AppState>,
    Path(id): Path<TestingPointId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<TestingPointEnriched>>> {
    let point = state.testing_points().activate(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::ok(point)))
}

#[utoipa::path(
    patch,
    path = "/sampling-points/deactivate/{id}",
    tag = "sampling-points",
    summary = "Deactivate testing point",
    responses(
        (status = 200, description = "Testing point deactivated", body = ApiResponse<TestingPointEnriched>),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Testing point not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Testing point ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn deactivate_testing_point(
    State(state): State<AppState>,
    Path(id): Path<TestingPointId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<TestingPointEnriched>>> {
    let point = state.testing_points().deactivate(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::ok(point)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::{
        envelope::ApiResponse,
        testing_points::{TestingPointEnriched, TestingPointResponse},
    };
    use crate::db::Records;
    use crate::db::models::testing_points::{PointStatus, TestingPoint};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    const BASE: &str = "/api/admin/quality/sampling-points";

    fn create_body(name: &str) -> Value {
        json!({
            "pointName": name,
            "pointType": "DOMICILIO",
            "coordinates": { "latitude": -12.05, "longitude": -77.04 }
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_requests_without_organization_header_are_rejected() {
        let (app, _state) = create_test_app();

        let response = app.get(BASE).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["data"], Value::Null);
        assert!(body["error"].as_str().unwrap().contains("x-organization-id"));
    }

    #[test_log::test(tokio::test)]
    async fn test_create_generates_code_and_forces_active() {
        let (app, _state) = create_test_app();
        let (header, value) = organization_header(TEST_ORGANIZATION);

        let response = app
            .post(BASE)
            .add_header(header.clone(), value.clone())
            .json(&json!({
                "pointName": "Plaza de Armas",
                "pointType": "DOMICILIO",
                "coordinates": { "latitude": -12.05, "longitude": -77.04 },
                "organizationId": "someone-else",
                "status": "INACTIVE"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<TestingPointResponse> = response.json();
        assert!(body.success);
        let point = body.data.unwrap();
        assert_eq!(point.point_code, "PM001");
        assert_eq!(point.organization_id, TEST_ORGANIZATION);
        assert_eq!(point.status, PointStatus::Active);

        let second: ApiResponse<TestingPointResponse> =
            app.post(BASE).add_header(header, value).json(&create_body("Mercado")).await.json();
        assert_eq!(second.data.unwrap().point_code, "PM002");
    }

    #[test_log::test(tokio::test)]
    async fn test_create_rejects_invalid_bodies() {
        let (app, _state) = create_test_app();
        let (header, value) = organization_header(TEST_ORGANIZATION);

        let blank_name = app
            .post(BASE)
            .add_header(header.clone(), value.clone())
            .json(&create_body("   "))
            .await;
        blank_name.assert_status_bad_request();

        let missing_coordinates = app
            .post(BASE)
            .add_header(header, value)
            .json(&json!({ "pointName": "Somewhere" }))
            .await;
        missing_coordinates.assert_status_bad_request();
        let body: Value = missing_coordinates.json();
        assert_eq!(body["success"], json!(false));
    }

    #[test_log::test(tokio::test)]
    async fn test_get_resolves_organization_from_admins() {
        let (app, state) = create_test_app();
        let (header, value) = organization_header(TEST_ORGANIZATION);
        let point = Records::<TestingPoint>::new(state.store.clone())
            .save(&testing_point(TEST_ORGANIZATION, "PM001"))
            .await
            .unwrap();

        let response = app.get(&format!("{BASE}/{}", point.id)).add_header(header, value).await;

        response.assert_status_ok();
        let body: ApiResponse<TestingPointEnriched> = response.json();
        let organization = body.data.unwrap().organization.unwrap();
        assert_eq!(organization.organization_id.as_deref(), Some(TEST_ORGANIZATION));
    }

    #[test_log::test(tokio::test)]
    async fn test_organization_is_null_when_identity_service_is_unavailable() {
        let (app, state) = create_test_app_with(std::sync::Arc::new(UnavailableDirectory));
        let (header, value) = organization_header(TEST_ORGANIZATION);
        let point = Records::<TestingPoint>::new(state.store.clone())
            .save(&testing_point(TEST_ORGANIZATION, "PM001"))
            .await
            .unwrap();

        let response = app.get(&format!("{BASE}/{}", point.id)).add_header(header, value).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["pointCode"], json!("PM001"));
        assert_eq!(body["data"]["organization"], Value::Null);
    }

    #[test_log::test(tokio::test)]
    async fn test_points_of_other_organizations_are_not_found() {
        let (app, state) = create_test_app();
        let (header, value) = organization_header(TEST_ORGANIZATION);
        let foreign = Records::<TestingPoint>::new(state.store.clone())
            .save(&testing_point("org-2", "PM001"))
            .await
            .unwrap();

        let response = app
            .get(&format!("{BASE}/{}", foreign.id))
            .add_header(header.clone(), value.clone())
            .await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!(format!("TestingPoint with ID {} not found", foreign.id)));

        let listed: ApiResponse<Vec<TestingPointEnriched>> = app.get(BASE).add_header(header, value).await.json();
        assert!(listed.data.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_deactivate_then_activate() {
        let (app, state) = create_test_app();
        let (header, value) = organization_header(TEST_ORGANIZATION);
        let point = Records::<TestingPoint>::new(state.store.clone())
            .save(&testing_point(TEST_ORGANIZATION, "PM001"))
            .await
            .unwrap();

        let response = app
            .patch(&format!("{BASE}/deactivate/{}", point.id))
            .add_header(header.clone(), value.clone())
            .await;
        response.assert_status_ok();
        let body: ApiResponse<TestingPointEnriched> = response.json();
        assert_eq!(body.data.unwrap().status, PointStatus::Inactive);

        let inactive: ApiResponse<Vec<TestingPointEnriched>> = app
            .get(&format!("{BASE}/inactive"))
            .add_header(header.clone(), value.clone())
            .await
            .json();
        assert_eq!(inactive.data.unwrap().len(), 1);

        let active: ApiResponse<Vec<TestingPointEnriched>> = app
            .get(&format!("{BASE}/active"))
            .add_header(header.clone(), value.clone())
            .await
            .json();
        assert!(active.data.unwrap().is_empty());

        let response = app
            .patch(&format!("{BASE}/activate/{}", point.id))
            .add_header(header, value)
            .await;
        let body: ApiResponse<TestingPointEnriched> = response.json();
        assert_eq!(body.data.unwrap().status, PointStatus::Active);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_and_delete() {
        let (app, state) = create_test_app();
        let (header, value) = organization_header(TEST_ORGANIZATION);
        let point = Records::<TestingPoint>::new(state.store.clone())
            .save(&testing_point(TEST_ORGANIZATION, "PM001"))
            .await
            .unwrap();

        let response = app
            .put(&format!("{BASE}/{}", point.id))
            .add_header(header.clone(), value.clone())
            .json(&json!({ "pointName": "Renamed", "street": "Jr. Lima 123" }))
            .await;
        response.assert_status_ok();
        let updated: ApiResponse<TestingPointResponse> = response.json();
        let updated = updated.data.unwrap();
        assert_eq!(updated.point_name, "Renamed");
        assert_eq!(updated.point_code, "PM001");
        assert_eq!(updated.coordinates, point.coordinates);

        let response = app
            .delete(&format!("{BASE}/{}", point.id))
            .add_header(header.clone(), value.clone())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "success": true, "data": null, "error": null }));

        app.get(&format!("{BASE}/{}", point.id))
            .add_header(header.clone(), value.clone())
            .await
            .assert_status_not_found();

        // Deleting again still succeeds
        app.delete(&format!("{BASE}/{}", point.id))
            .add_header(header, value)
            .await
            .assert_status_ok();
    }
}
