use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::response::ApiResult;
use crate::service::activity;

pub async fn list_activity_logs(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(activity::list(&state, &principal)?))
}
