use axum::http::{HeaderMap, header::AUTHORIZATION};

use super::TokenCodec;
use crate::error::{Error, Result};
use crate::types::{Principal, Role};

/// Extracts the credential from a `Bearer` authorization header.
/// Returns None if the header is absent, not UTF-8, or uses another scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Resolves the caller from the request headers.
///
/// Every verification failure (missing header, malformed token, bad
/// signature, expiry) collapses to `Unauthenticated`; the specific cause is
/// only logged.
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> Result<Principal> {
    require_role(codec, headers, &Role::ALL)
}

/// Like [`authenticate`], but also fails with `Forbidden` when the caller's
/// role is not in `allowed`.
pub fn require_role(
    codec: &TokenCodec,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<Principal> {
    let token = bearer_token(headers).ok_or(Error::Unauthenticated)?;

    let principal: Principal = match codec.verify(token) {
        Ok(claims) => claims.into(),
        Err(e) => {
            tracing::debug!("Rejected session token: {e}");
            return Err(Error::Unauthenticated);
        }
    };

    if !principal.has_role(allowed) {
        return Err(Error::Forbidden);
    }
    Ok(principal)
}
