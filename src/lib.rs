//! # Custodian
//!
//! A records-management server: department-scoped record keeping, retention
//! and disposal tracking, document requests, file attachments and an audit
//! trail. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! custodian = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use custodian::config::ServerConfig;
//! use custodian::server::{AppState, create_router};
//! use custodian::store::{SqliteStore, Store};
//!
//! let config = ServerConfig {
//!     jwt_secret: "change-me".to_string(),
//!     ..ServerConfig::default()
//! };
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), config).unwrap());
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `custodian` binary. Disable with `default-features = false`.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod files;
pub mod policy;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
