use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::auth::Authenticated;
use crate::server::AppState;
use crate::server::extract::PathParam;
use crate::server::response::{ApiError, ApiResponse, ApiResult};
use crate::server::validation::Required;
use crate::service::files;

/// Body-limit hits share the oversize message; other framing errors stay generic.
fn multipart_error(e: MultipartError, max: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return files::oversize(max).into();
    }
    tracing::debug!("Rejected multipart body: {}", e.body_text());
    ApiError::bad_request("Invalid multipart body")
}

/// `multipart/form-data` with a `record_id` text field and a `file` field.
///
/// The file is buffered chunk by chunk and refused as soon as it passes the
/// upload limit, so an oversize upload never reaches storage.
pub async fn upload_file(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let max = files::max_upload_bytes(&state);
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload request: {e}");
        ApiError::bad_request("Expected a multipart/form-data body")
    })?;
    let mut record_id = None;
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, max))? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("record_id") => {
                let text = field.text().await.map_err(|e| multipart_error(e, max))?;
                let id = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::bad_request("record_id must be an integer"))?;
                record_id = Some(id);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max))? {
                    if data.len() + chunk.len() > max {
                        return Err(files::oversize(max).into());
                    }
                    data.extend_from_slice(&chunk);
                }
                upload = Some((file_name, data));
            }
            _ => {}
        }
    }

    let mut required = Required::new();
    let record_id = required.value("record_id", record_id);
    let upload = required.value("file", upload);
    required.finish()?;

    let (file_name, data) = upload.unwrap_or_default();
    let file = files::upload(
        &state,
        &principal,
        record_id.unwrap_or_default(),
        &file_name,
        &data,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("File uploaded successfully", file)),
    ))
}

pub async fn list_files(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(record_id): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(files::list(&state, &principal, record_id)?))
}

pub async fn download_file(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Response> {
    let (file, reader, size) = files::open(&state, &principal, id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );
    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .map_err(|e| {
            tracing::error!("Failed to build download response: {e}");
            ApiError::internal()
        })
}

pub async fn delete_file(
    Authenticated(principal): Authenticated,
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    files::delete(&state, &principal, id).await?;
    Ok(Json(ApiResponse::message("File deleted successfully")))
}
