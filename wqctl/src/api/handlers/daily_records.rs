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
            daily_records::{DailyRecordEnriched, DailyRecordRequest},
            envelope::ApiResponse,
        },
    },
    auth::OrganizationContext,
    errors::Result,
    types::DailyRecordId,
};

#[utoipa::path(
    get,
    path = "/daily-records",
    tag = "daily-records",
    summary = "List daily records",
    description = "Lists every daily record of the caller's organization, soft-deleted ones included.",
    responses(
        (status = 200, description = "Daily records", body = ApiResponse<Vec<DailyRecordEnriched>>),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_daily_records(
    State(state): State<AppState>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<Vec<DailyRecordEnriched>>>> {
    let records = state.daily_records().get_all(&context.organization_id).await?;
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/daily-records/{id}",
    tag = "daily-records",
    summary = "Get daily record",
    responses(
        (status = 200, description = "Daily record details", body = ApiResponse<DailyRecordEnriched>),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Daily record not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Daily record ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_daily_record(
    State(state): State<AppState>,
    Path(id): Path<DailyRecordId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<DailyRecordEnriched>>> {
    let record = state.daily_records().get_by_id(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::ok(record)))
}

#[utoipa::path(
    post,
    path = "/daily-records",
    tag = "daily-records",
    summary = "Create daily record",
    request_body = DailyRecordRequest,
    responses(
        (status = 201, description = "Daily record created", body = ApiResponse<DailyRecordEnriched>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_daily_record(
    State(state): State<AppState>,
    context: OrganizationContext,
    JsonBody(create): JsonBody<DailyRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DailyRecordEnriched>>)> {
    let record = state.daily_records().create(&context.organization_id, create).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

#[utoipa::path(
    put,
    path = "/daily-records/{id}",
    tag = "daily-records",
    summary = "Update daily record",
    request_body = DailyRecordRequest,
    responses(
        (status = 200, description = "Daily record updated", body = ApiResponse<DailyRecordEnriched>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Daily record not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Daily record ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_daily_record(
    State(state): State<AppState>,
    Path(id): Path<DailyRecordId>,
    context: OrganizationContext,
    JsonBody(update): JsonBody<DailyRecordRequest>,
) -> Result<Json<ApiResponse<DailyRecordEnriched>>> {
    let record = state.daily_records().update(&context.organization_id, &id, update).await?;
    Ok(Json(ApiResponse::ok(record)))
}

#[utoipa::path(
    delete,
    path = "/daily-records/{id}",
    tag = "daily-records",
    summary = "Soft-delete daily record",
    responses(
        (status = 200, description = "Daily record marked as deleted"),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Daily record not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Daily record ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_daily_record(
    State(state): State<AppState>,
    Path(id): Path<DailyRecordId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<()>>> {
    state.daily_records().soft_delete(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::empty()))
}

#[utoipa::path(
    delete,
    path = "/daily-records/physical/{id}",
    tag = "daily-records",
    summary = "Permanently delete daily record",
    description = "Removes the record permanently. Deleting an unknown ID succeeds.",
    responses(
        (status = 200, description = "Daily record removed"),
        (status = 401, description = "Missing organization header"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Daily record ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn physically_delete_daily_record(
    State(state): State<AppState>,
    Path(id): Path<DailyRecordId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<()>>> {
    state.daily_records().hard_delete(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::empty()))
}

#[utoipa::path(
    patch,
    path = "/daily-records/restore/{id}",
    tag = "daily-records",
    summary = "Restore daily record",
    responses(
        (status = 200, description = "Daily record restored", body = ApiResponse<DailyRecordEnriched>),
        (status = 401, description = "Missing organization header"),
        (status = 404, description = "Daily record not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Daily record ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn restore_daily_record(
    State(state): State<AppState>,
    Path(id): Path<DailyRecordId>,
    context: OrganizationContext,
) -> Result<Json<ApiResponse<DailyRecordEnriched>>> {
    let record = state.daily_records().restore(&context.organization_id, &id).await?;
    Ok(Json(ApiResponse::ok(record)))
}
