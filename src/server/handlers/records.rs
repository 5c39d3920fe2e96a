use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::dto::RecordPayload;
use crate::server::extract::{JsonBody, PathParam};
use crate::server::response::{ApiResponse, ApiResult};
use crate::service::records;

pub async fn list_records(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(records::list(&state, &principal)?))
}

pub async fn get_record(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(records::get(&state, &principal, id)?))
}

pub async fn create_record(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RecordPayload>,
) -> ApiResult<impl IntoResponse> {
    let (fields, department_id) = req.into_fields()?;
    let record = records::create(&state, &principal, fields, department_id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Record created successfully", record)),
    ))
}

pub async fn update_record(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<RecordPayload>,
) -> ApiResult<impl IntoResponse> {
    let (fields, _) = req.into_fields()?;
    let record = records::update(&state, &principal, id, fields)?;

    Ok(Json(ApiResponse::success("Record updated successfully", record)))
}

pub async fn delete_record(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    records::delete(&state, &principal, id).await?;
    Ok(Json(ApiResponse::message("Record deleted successfully")))
}

pub async fn disposal_reminders(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(records::disposal_reminders(&state, &principal)?))
}

pub async fn public_documents(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(records::public_documents(&state, &principal)?))
}
