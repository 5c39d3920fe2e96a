mod account;
mod activity;
mod departments;
mod files;
mod records;
mod requests;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::server::AppState;

/// Slack above the file limit for multipart framing and the other fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        // Account routes
        .route("/auth/login", post(account::login))
        .route("/auth/profile", get(account::profile))
        .route("/auth/change-password", post(account::change_password))
        // Record routes
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route(
            "/records/disposal-reminders",
            get(records::disposal_reminders),
        )
        .route("/records/public", get(records::public_documents))
        .route(
            "/records/{id}",
            get(records::get_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
        // Department routes
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route("/departments/analytics", get(departments::analytics))
        .route(
            "/departments/{id}",
            put(departments::update_department).delete(departments::delete_department),
        )
        // User routes
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/users/{id}/reset-password", post(users::reset_password))
        // Document request routes
        .route(
            "/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/requests/{id}", put(requests::decide_request))
        // Activity log routes
        .route("/activity-logs", get(activity::list_activity_logs))
        // File routes; GET takes a record id, DELETE a file id
        .route(
            "/files",
            post(files::upload_file).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route(
            "/files/{id}",
            get(files::list_files).delete(files::delete_file),
        )
        .route("/files/{id}/download", get(files::download_file))
}
