use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::gate::authenticate;
use crate::server::AppState;
use crate::server::response::ApiError;
use crate::types::Principal;

/// Extractor that requires a valid session token.
pub struct Authenticated(pub Principal);

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = authenticate(&state.codec, &parts.headers)?;
        Ok(Authenticated(principal))
    }
}
