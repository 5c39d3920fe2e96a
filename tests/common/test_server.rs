use std::path::Path;
use std::sync::Arc;

use custodian::auth::PasswordHasher;
use custodian::config::ServerConfig;
use custodian::server::{AppState, create_router};
use custodian::store::{SqliteStore, Store};
use custodian::types::{Department, NewUser, Role};
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const ADMIN_SCHOOL_ID: &str = "admin";
pub const ADMIN_PASSWORD: &str = "root";

/// A router served in-process on an ephemeral port, backed by a fresh data dir.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub store: Arc<SqliteStore>,
    pub client: reqwest::Client,
    server_task: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");

        let mut config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            jwt_secret: "integration-test-secret".to_string(),
            ..ServerConfig::default()
        };
        configure(&mut config);

        let store = Arc::new(SqliteStore::new(config.db_path()).expect("open store"));
        store.initialize().expect("initialize schema");
        store
            .create_user(&NewUser {
                school_id: ADMIN_SCHOOL_ID.to_string(),
                password_hash: PasswordHasher::new().hash(ADMIN_PASSWORD).expect("hash"),
                full_name: Some("System Admin".to_string()),
                email: "admin@example.edu".to_string(),
                role: Role::Admin,
                department_id: None,
            })
            .expect("create admin");

        let state = Arc::new(AppState::new(store.clone(), config).expect("build state"));
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let server_task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let server = Self {
            temp_dir,
            base_url: format!("http://127.0.0.1:{port}"),
            store,
            client: reqwest::Client::new(),
            server_task: Some(server_task),
        };
        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        for _ in 0..50 {
            if self.client.get(self.url("/health")).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("Server did not become ready");
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Number of blobs in the uploads directory, temp files included.
    pub fn stored_blob_count(&self) -> usize {
        fn count(dir: &Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .filter_map(Result::ok)
                        .map(|e| {
                            let path = e.path();
                            if path.is_dir() { count(&path) } else { 1 }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        count(&self.data_dir().join("uploads"))
    }

    pub fn department(&self, name: &str) -> Department {
        self.store.create_department(name).expect("create department")
    }

    /// Creates a user directly in the store with the given password.
    pub fn user(
        &self,
        school_id: &str,
        password: &str,
        role: Role,
        department_id: Option<i64>,
    ) -> i64 {
        self.store
            .create_user(&NewUser {
                school_id: school_id.to_string(),
                password_hash: PasswordHasher::new().hash(password).expect("hash"),
                full_name: Some(format!("User {school_id}")),
                email: format!("{school_id}@example.edu"),
                role,
                department_id,
            })
            .expect("create user")
            .id
    }

    pub async fn login(&self, school_id: &str, password: &str) -> String {
        let resp: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({"school_id": school_id, "password": password}))
            .send()
            .await
            .expect("login")
            .json()
            .await
            .expect("parse login response");
        resp["token"].as_str().expect("token").to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_SCHOOL_ID, ADMIN_PASSWORD).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.server_task.take() {
            task.abort();
        }
    }
}
