use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::types::{Principal, Role};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    typ: String,
    alg: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: "HS256".to_string(),
        }
    }
}

/// The identity fields a session token carries, before timestamps are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub school_id: String,
    pub role: Role,
    pub department_id: Option<i64>,
    pub full_name: Option<String>,
}

/// The signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub session: SessionClaims,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.session.user_id,
            school_id: claims.session.school_id,
            role: claims.session.role,
            department_id: claims.session.department_id,
            full_name: claims.session.full_name,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Signs and verifies HS256 session tokens of the form
/// `base64url(header).base64url(payload).base64url(signature)`.
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: i64) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(Error::MissingSecret);
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            ttl_seconds,
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(&self, session: SessionClaims) -> Result<String> {
        self.issue_at(session, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (unix seconds).
    pub fn issue_at(&self, session: SessionClaims, now: i64) -> Result<String> {
        let exp = now
            .checked_add(self.ttl_seconds)
            .ok_or_else(|| Error::Config("token lifetime overflows the clock".to_string()))?;
        let claims = Claims {
            session,
            iat: now,
            exp,
        };

        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::default())?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as if the current time were `now` (unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(Error::MalformedToken);
        }
        let (header, payload, signature) = (parts[0], parts[1], parts[2]);

        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Error::BadSignature)?;
        let expected = self.sign(format!("{header}.{payload}").as_bytes());
        if provided.len() != expected.len() || !bool::from(provided.ct_eq(&expected)) {
            return Err(Error::BadSignature);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| Error::MalformedToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| Error::MalformedToken)?;

        if now > claims.exp {
            return Err(Error::TokenExpired);
        }

        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("hmac key length is unrestricted"));
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}
