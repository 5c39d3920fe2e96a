use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::dto::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::server::extract::JsonBody;
use crate::server::response::{ApiResponse, ApiResult};
use crate::server::validation::Required;
use crate::service::account;

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut required = Required::new();
    let school_id = required.text("school_id", req.school_id);
    let password = required.value("password", req.password.filter(|p| !p.is_empty()));
    required.finish()?;

    let (token, user) = account::login(&state, &school_id, &password.unwrap_or_default())?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

pub async fn profile(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let user = account::profile(&state, &principal)?;
    Ok(Json(user))
}

pub async fn change_password(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    account::change_password(
        &state,
        &principal,
        req.old_password.as_deref().unwrap_or_default(),
        req.new_password.as_deref().unwrap_or_default(),
    )?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}
