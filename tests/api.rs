mod common;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use custodian::types::Role;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use common::TestServer;

fn record_body(title: &str, department_id: Option<i64>) -> Value {
    json!({
        "record_series_title_description": title,
        "time_value": "T",
        "retention_period_total": 3,
        "date_of_record": "2001-06-30",
        "record_medium": "Paper",
        "department_id": department_id,
    })
}

async fn create_record(
    server: &TestServer,
    token: &str,
    title: &str,
    department_id: Option<i64>,
) -> i64 {
    let resp = server
        .client
        .post(server.url("/records"))
        .bearer_auth(token)
        .json(&record_body(title, department_id))
        .send()
        .await
        .expect("create record");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse record");
    body["data"]["id"].as_i64().expect("record id")
}

async fn upload(
    server: &TestServer,
    token: &str,
    record_id: i64,
    name: &str,
    data: Vec<u8>,
) -> reqwest::Response {
    let form = Form::new()
        .text("record_id", record_id.to_string())
        .part("file", Part::bytes(data).file_name(name.to_string()));
    server
        .client
        .post(server.url("/files"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("upload")
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let server = TestServer::start().await;
    let dept = server.department("Registrar");
    server.user("22-1-02642", "abcd", Role::Custodian, Some(dept.id));

    let resp = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({"school_id": "22-1-02642", "password": "abcd"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let payload = token.split('.').nth(1).unwrap();
    let claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
    assert_eq!(claims["role"], "Departmental Record Custodian");
    assert_eq!(claims["department_id"], dept.id);

    let resp = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({"school_id": "22-1-02642", "password": "abce"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert!(body.get("token").is_none());
    assert_eq!(body["error"], "Invalid credentials");

    // Only the successful login is audited.
    let admin = server.admin_token().await;
    let logs: Value = server
        .client
        .get(server.url("/activity-logs"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let logins: Vec<&Value> = logs
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["school_id"] == "22-1-02642")
        .collect();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0]["operation"], "Login");
}

#[tokio::test]
async fn test_bad_tokens_are_unauthenticated() {
    let server = TestServer::start().await;
    let token = server.admin_token().await;
    let (signed, _) = token.rsplit_once('.').unwrap();
    let forged = format!("{signed}.AAAA");

    for auth in [None, Some("garbage"), Some("a.b"), Some(forged.as_str())] {
        let mut req = server.client.get(server.url("/records"));
        if let Some(auth) = auth {
            req = req.bearer_auth(auth);
        }
        let resp = req.send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let server = TestServer::start_with(|config| config.token_ttl_seconds = 1).await;
    let token = server.admin_token().await;
    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

    let resp = server
        .client
        .get(server.url("/auth/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_sees_only_own_department_records() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    let d2 = server.department("Accounting");
    server.user("22-1-00001", "abcd", Role::Staff, Some(d1.id));

    let admin = server.admin_token().await;
    let own = create_record(&server, &admin, "Enrollment forms", Some(d1.id)).await;
    let newer = create_record(&server, &admin, "Vouchers", Some(d2.id)).await;

    let staff = server.login("22-1-00001", "abcd").await;
    let records: Value = server
        .client
        .get(server.url("/records"))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![own]);

    let resp = server
        .client
        .get(server.url(&format!("/records/{newer}")))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .put(server.url(&format!("/records/{newer}")))
        .bearer_auth(&staff)
        .json(&record_body("Hijacked", None))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_detail_and_missing_fields() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    let admin = server.admin_token().await;
    let id = create_record(&server, &admin, "Minutes", Some(d1.id)).await;

    let record: Value = server
        .client
        .get(server.url(&format!("/records/{id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["record_series_title_description"], "Minutes");
    assert_eq!(record["calculated_disposal_date"], "2004-06-30");
    assert_eq!(record["department_name"], "Registrar");
    assert_eq!(record["files"], json!([]));

    let resp = server
        .client
        .post(server.url("/records"))
        .bearer_auth(&admin)
        .json(&json!({"department_id": d1.id}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("record_series_title_description"));
    assert!(error.contains("time_value"));
}

#[tokio::test]
async fn test_disposal_reminders_and_public_documents() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    let admin = server.admin_token().await;
    create_record(&server, &admin, "Old receipts", Some(d1.id)).await;

    let mut open = record_body("Student handbook", Some(d1.id));
    open["restrictions"] = json!("Open Access");
    open["time_value"] = json!("P");
    server
        .client
        .post(server.url("/records"))
        .bearer_auth(&admin)
        .json(&open)
        .send()
        .await
        .unwrap();

    let due: Value = server
        .client
        .get(server.url("/records/disposal-reminders"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(due.as_array().unwrap().len(), 1);
    assert_eq!(due[0]["record_series_title_description"], "Old receipts");

    let public: Value = server
        .client
        .get(server.url("/records/public"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public.as_array().unwrap().len(), 1);
    assert_eq!(public[0]["record_series_title_description"], "Student handbook");
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    let admin = server.admin_token().await;

    let mut body = record_body("Minutes", Some(d1.id));
    body["retention_period_total"] = json!("three");
    let typed_wrong = server
        .client
        .post(server.url("/records"))
        .bearer_auth(&admin)
        .json(&body)
        .send()
        .await
        .unwrap();
    let not_json = server
        .client
        .post(server.url("/departments"))
        .bearer_auth(&admin)
        .header("content-type", "application/json")
        .body("{name:")
        .send()
        .await
        .unwrap();
    let bad_id = server
        .client
        .get(server.url("/records/abc"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let not_multipart = server
        .client
        .post(server.url("/files"))
        .bearer_auth(&admin)
        .json(&json!({"record_id": 1}))
        .send()
        .await
        .unwrap();

    for resp in [typed_wrong, not_json, bad_id, not_multipart] {
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        let error = body["error"].as_str().unwrap();
        assert!(!error.contains("i32") && !error.contains("i64"), "leaked detail: {error}");
    }
}

#[tokio::test]
async fn test_staff_cannot_read_activity_logs() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    server.user("22-1-00001", "abcd", Role::Staff, Some(d1.id));
    server.user("22-1-00002", "abcd", Role::Custodian, Some(d1.id));

    let staff = server.login("22-1-00001", "abcd").await;
    let resp = server
        .client
        .get(server.url("/activity-logs"))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let custodian = server.login("22-1-00002", "abcd").await;
    let logs: Value = server
        .client
        .get(server.url("/activity-logs"))
        .bearer_auth(&custodian)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // Both department members logged in; the admin did not.
    assert_eq!(logs.as_array().unwrap().len(), 2);
    assert!(logs.as_array().unwrap().iter().all(|e| e["office"] == "Registrar"));
}

#[tokio::test]
async fn test_record_delete_is_idempotent_not_found() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    server.user("22-1-00001", "abcd", Role::Staff, Some(d1.id));
    server.user("22-1-00002", "abcd", Role::Custodian, Some(d1.id));

    let staff = server.login("22-1-00001", "abcd").await;
    let id = create_record(&server, &staff, "Ledger", None).await;

    let resp = server
        .client
        .delete(server.url(&format!("/records/{id}")))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let custodian = server.login("22-1-00002", "abcd").await;
    for expected in [StatusCode::OK, StatusCode::NOT_FOUND] {
        let resp = server
            .client
            .delete(server.url(&format!("/records/{id}")))
            .bearer_auth(&custodian)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), expected);
    }
}

#[tokio::test]
async fn test_file_upload_list_download_delete() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    server.user("22-1-00001", "abcd", Role::Staff, Some(d1.id));
    let staff = server.login("22-1-00001", "abcd").await;
    let record_id = create_record(&server, &staff, "Scans", None).await;

    let resp = upload(&server, &staff, record_id, "scan.pdf", b"%PDF-1.4 test".to_vec()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let file_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["file_name"], "scan.pdf");
    assert_ne!(body["data"]["file_path"], "scan.pdf");
    assert_eq!(server.stored_blob_count(), 1);

    let files: Value = server
        .client
        .get(server.url(&format!("/files/{record_id}")))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(files.as_array().unwrap().len(), 1);

    let resp = server
        .client
        .get(server.url(&format!("/files/{file_id}/download")))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"%PDF-1.4 test");

    for expected in [StatusCode::OK, StatusCode::NOT_FOUND] {
        let resp = server
            .client
            .delete(server.url(&format!("/files/{file_id}")))
            .bearer_auth(&staff)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), expected);
    }
    assert_eq!(server.stored_blob_count(), 0);
}

#[tokio::test]
async fn test_oversize_upload_rejected_without_write() {
    let server = TestServer::start_with(|config| config.max_upload_bytes = 1024).await;
    let d1 = server.department("Registrar");
    let admin = server.admin_token().await;
    let record_id = create_record(&server, &admin, "Scans", Some(d1.id)).await;

    let resp = upload(&server, &admin, record_id, "huge.bin", vec![0u8; 4096]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("maximum upload size"));
    assert_eq!(server.stored_blob_count(), 0);

    let files: Value = server
        .client
        .get(server.url(&format!("/files/{record_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(files, json!([]));
}

#[tokio::test]
async fn test_document_request_transitions() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    server.user("22-1-00001", "abcd", Role::Staff, Some(d1.id));
    let admin = server.admin_token().await;
    let record_id = create_record(&server, &admin, "Diplomas", Some(d1.id)).await;

    let staff = server.login("22-1-00001", "abcd").await;
    let resp = server
        .client
        .post(server.url("/requests"))
        .bearer_auth(&staff)
        .json(&json!({"record_id": record_id, "purpose": "Employment"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let request_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "Pending");

    let resp = server
        .client
        .put(server.url(&format!("/requests/{request_id}")))
        .bearer_auth(&staff)
        .json(&json!({"status": "Approved"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .put(server.url(&format!("/requests/{request_id}")))
        .bearer_auth(&admin)
        .json(&json!({"status": "Maybe"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .put(server.url(&format!("/requests/{request_id}")))
        .bearer_auth(&admin)
        .json(&json!({"status": "Denied"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let approval_date = body["data"]["approval_date"].clone();
    assert!(approval_date.is_string());

    let resp = server
        .client
        .put(server.url(&format!("/requests/{request_id}")))
        .bearer_auth(&admin)
        .json(&json!({"status": "Approved"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let mine: Value = server
        .client
        .get(server.url("/requests"))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine[0]["status"], "Denied");
    assert_eq!(mine[0]["approval_date"], approval_date);
}

#[tokio::test]
async fn test_user_and_department_admin() {
    let server = TestServer::start().await;
    let admin = server.admin_token().await;

    let resp = server
        .client
        .post(server.url("/departments"))
        .bearer_auth(&admin)
        .json(&json!({"name": "Library"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let dept_id = body["data"]["id"].as_i64().unwrap();

    let resp = server
        .client
        .post(server.url("/departments"))
        .bearer_auth(&admin)
        .json(&json!({"name": "Library"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let new_user = json!({
        "school_id": "22-1-09999",
        "password": "wxyz",
        "email": "librarian@example.edu",
        "role": "Staff",
        "department_id": dept_id
    });
    let resp = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&admin)
        .json(&new_user)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let user_id = body["data"]["id"].as_i64().unwrap();
    assert!(body["data"].get("password_hash").is_none());

    let resp = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&admin)
        .json(&new_user)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Still referenced by the new user.
    let resp = server
        .client
        .delete(server.url(&format!("/departments/{dept_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let librarian = server.login("22-1-09999", "wxyz").await;
    let resp = server
        .client
        .get(server.url("/users"))
        .bearer_auth(&librarian)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .post(server.url(&format!("/users/{user_id}/reset-password")))
        .bearer_auth(&admin)
        .json(&json!({"new_password": "lmno"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    server.login("22-1-09999", "lmno").await;

    let analytics: Value = server
        .client
        .get(server.url("/departments/analytics"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(analytics, json!([{"department": "Library", "document_count": 0}]));
}

#[tokio::test]
async fn test_change_password_flow() {
    let server = TestServer::start().await;
    let d1 = server.department("Registrar");
    server.user("22-1-00001", "abcd", Role::Staff, Some(d1.id));
    let token = server.login("22-1-00001", "abcd").await;

    let resp = server
        .client
        .post(server.url("/auth/change-password"))
        .bearer_auth(&token)
        .json(&json!({"old_password": "nope", "new_password": "efgh"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .client
        .post(server.url("/auth/change-password"))
        .bearer_auth(&token)
        .json(&json!({"old_password": "abcd", "new_password": "efgh"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let profile: Value = server
        .client
        .get(server.url("/auth/profile"))
        .bearer_auth(server.login("22-1-00001", "efgh").await)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["school_id"], "22-1-00001");
    assert_eq!(profile["department_name"], "Registrar");
}
