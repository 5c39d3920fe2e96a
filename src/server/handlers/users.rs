use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::dto::{CreateUserRequest, ResetPasswordRequest, UpdateUserRequest};
use crate::server::extract::{JsonBody, PathParam};
use crate::server::response::{ApiResponse, ApiResult};
use crate::service::users;

pub async fn list_users(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users::list(&state, &principal)?))
}

pub async fn create_user(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = users::create(&state, &principal, req.into_account()?)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created successfully", user)),
    ))
}

pub async fn update_user(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = users::update(&state, &principal, id, req.into_update()?)?;
    Ok(Json(ApiResponse::success("User updated successfully", user)))
}

pub async fn delete_user(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    users::delete(&state, &principal, id)?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

pub async fn reset_password(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    users::reset_password(
        &state,
        &principal,
        id,
        req.new_password.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(ApiResponse::message("Password reset successfully")))
}
