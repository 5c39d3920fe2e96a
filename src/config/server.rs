use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 86_400;

/// Length bounds applied to every password set through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> Result<()> {
        let len = password.chars().count();
        if len < self.min_len || len > self.max_len {
            let message = if self.min_len == self.max_len {
                format!("Password must be exactly {} characters", self.min_len)
            } else {
                format!(
                    "Password must be between {} and {} characters",
                    self.min_len, self.max_len
                )
            };
            return Err(Error::InvalidInput(message));
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_len: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// HMAC key for session tokens. Must be non-empty.
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub max_upload_bytes: usize,
    pub request_timeout_secs: u64,
    pub password_policy: PasswordPolicy,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(Error::MissingSecret);
        }
        if self.token_ttl_seconds <= 0 || self.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(Error::Config(format!(
                "token TTL must be between 1 and {MAX_TOKEN_TTL_SECONDS} seconds"
            )));
        }
        if self.password_policy.min_len == 0
            || self.password_policy.min_len > self.password_policy.max_len
        {
            return Err(Error::Config(format!(
                "invalid password length bounds {}..={}",
                self.password_policy.min_len, self.password_policy.max_len
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("custodian.db")
    }

    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            jwt_secret: String::new(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            password_policy: PasswordPolicy::default(),
        }
    }
}
