use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::dto::{CreateDocumentRequest, DecideRequest};
use crate::server::extract::{JsonBody, PathParam};
use crate::server::response::{ApiResponse, ApiResult};
use crate::server::validation::Required;
use crate::service::requests;

pub async fn list_requests(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(requests::list(&state, &principal)?))
}

pub async fn create_request(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateDocumentRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut required = Required::new();
    let record_id = required.value("record_id", req.record_id);
    let purpose = required.text("purpose", req.purpose);
    required.finish()?;

    let request = requests::create(
        &state,
        &principal,
        record_id.unwrap_or_default(),
        &purpose,
        req.id_document_path,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Request submitted successfully", request)),
    ))
}

pub async fn decide_request(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<DecideRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = requests::decide(
        &state,
        &principal,
        id,
        req.status.as_deref().unwrap_or_default(),
    )?;

    let message = format!("Request {}", request.status.as_str().to_lowercase());
    Ok(Json(ApiResponse::success(message, request)))
}
