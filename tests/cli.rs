//! CLI integration tests for the custodian admin and serve commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use custodian::auth::PasswordHasher;
use custodian::store::{SqliteStore, Store};
use custodian::types::Role;
use predicates::prelude::*;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("custodian").expect("failed to find binary");
        cmd.env("NO_COLOR", "1")
            .env_remove("CUSTODIAN_DATA_DIR")
            .env_remove("CUSTODIAN_JWT_SECRET");
        cmd
    }

    fn init(&self, extra: &[&str]) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["admin", "init", "--data-dir", &self.data_dir_str(), "--non-interactive"])
            .args(extra)
            .assert()
    }

    fn init_admin(&self) -> assert_cmd::assert::Assert {
        self.init(&[
            "--school-id",
            "admin",
            "--password",
            "abcd",
            "--email",
            "admin@example.edu",
        ])
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("custodian.db")).expect("open store")
    }
}

#[test]
fn test_init_creates_admin() {
    let ctx = TestContext::new();

    ctx.init_admin()
        .success()
        .stdout(predicate::str::contains("Created admin account 'admin'"));

    assert!(ctx.data_dir().join("uploads").is_dir());

    let store = ctx.store();
    assert!(store.has_admin().unwrap());
    let admin = store.get_user_by_school_id("admin").unwrap().unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(admin.department_id, None);
    assert!(PasswordHasher::new().verify("abcd", &admin.password_hash).unwrap());
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();
    ctx.init_admin().success();

    ctx.init_admin()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_init_non_interactive_requires_values() {
    let ctx = TestContext::new();

    ctx.init(&["--email", "admin@example.edu", "--password", "abcd"])
        .failure()
        .stderr(predicate::str::contains("--school-id is required with --non-interactive"));

    ctx.init(&["--school-id", "admin", "--email", "admin@example.edu"])
        .failure()
        .stderr(predicate::str::contains("--password is required with --non-interactive"));

    assert!(!ctx.store().has_admin().unwrap());
}

#[test]
fn test_init_applies_password_policy() {
    let ctx = TestContext::new();

    ctx.init(&[
        "--school-id",
        "admin",
        "--password",
        "toolongpassword",
        "--email",
        "admin@example.edu",
    ])
    .failure();
    assert!(!ctx.store().has_admin().unwrap());

    ctx.init(&[
        "--school-id",
        "admin",
        "--password",
        "a-longer-passphrase",
        "--email",
        "admin@example.edu",
        "--max-password-length",
        "64",
    ])
    .success();
}

#[test]
fn test_serve_requires_secret() {
    let ctx = TestContext::new();
    ctx.init_admin().success();

    ctx.cmd()
        .args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JWT secret is not configured"));
}

#[test]
fn test_serve_requires_init() {
    let ctx = TestContext::new();

    ctx.cmd()
        .env("CUSTODIAN_JWT_SECRET", "some-secret")
        .args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));

    assert!(!ctx.data_dir().join("custodian.db").exists());
}

#[test]
fn test_gen_secret() {
    let ctx = TestContext::new();

    let output = ctx.cmd().args(["admin", "gen-secret"]).output().unwrap();
    assert!(output.status.success());

    let secret = String::from_utf8(output.stdout).unwrap();
    let secret = secret.trim();
    assert_eq!(secret.len(), 43);
    assert!(secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let again = ctx.cmd().args(["admin", "gen-secret"]).output().unwrap();
    assert_ne!(String::from_utf8(again.stdout).unwrap().trim(), secret);
}
