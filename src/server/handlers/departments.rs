use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::dto::DepartmentPayload;
use crate::server::extract::{JsonBody, PathParam};
use crate::server::response::{ApiResponse, ApiResult};
use crate::service::departments;

pub async fn list_departments(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(departments::list(&state, &principal)?))
}

pub async fn create_department(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<DepartmentPayload>,
) -> ApiResult<impl IntoResponse> {
    let department = departments::create(&state, &principal, &req.into_name()?)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Department created successfully", department)),
    ))
}

pub async fn update_department(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<DepartmentPayload>,
) -> ApiResult<impl IntoResponse> {
    let department = departments::update(&state, &principal, id, &req.into_name()?)?;
    Ok(Json(ApiResponse::success(
        "Department updated successfully",
        department,
    )))
}

pub async fn delete_department(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    departments::delete(&state, &principal, id)?;
    Ok(Json(ApiResponse::message("Department deleted successfully")))
}

pub async fn analytics(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(departments::analytics(&state, &principal)?))
}
