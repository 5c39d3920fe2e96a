use std::sync::Arc;
use std::time::Instant;

use axum::error_handling::HandleErrorLayer;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{BoxError, Router, routing::get};
use tower::ServiceBuilder;
use tower::timeout::{TimeoutLayer, error::Elapsed};

use super::handlers::api_router;
use super::response::ApiError;
use crate::audit::AuditRecorder;
use crate::auth::{PasswordHasher, TokenCodec};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::files::FileStorage;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub codec: TokenCodec,
    pub hasher: PasswordHasher,
    pub storage: FileStorage,
    pub audit: AuditRecorder,
    pub config: ServerConfig,
}

impl AppState {
    /// Builds the shared state from a validated configuration.
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            codec: TokenCodec::new(&config.jwt_secret, config.token_ttl_seconds)?,
            hasher: PasswordHasher::new(),
            storage: FileStorage::new(&config.uploads_dir()),
            audit: AuditRecorder::new(store.clone()),
            store,
            config,
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::request_timeout()
    } else {
        tracing::error!("Unhandled middleware error: {err}");
        ApiError::internal()
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/health", get(health))
        .merge(api_router(state.config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
