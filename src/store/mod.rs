mod filter;
mod schema;
mod sqlite;

pub use filter::{ScopeColumns, render as render_filter};
pub use sqlite::SqliteStore;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::policy::Filter;
use crate::types::*;

/// Admin-editable user attributes.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i64>,
}

/// Store defines the database interface.
///
/// Every method that takes a [`Filter`] applies it as an extra predicate, so
/// a row outside the caller's scope behaves exactly like a missing row.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Department operations
    fn create_department(&self, name: &str) -> Result<Department>;
    fn get_department(&self, id: i64) -> Result<Option<Department>>;
    fn list_departments(&self) -> Result<Vec<Department>>;
    fn update_department(&self, id: i64, name: &str) -> Result<bool>;
    fn delete_department(&self, id: i64) -> Result<bool>;
    fn department_counts(&self, filter: &Filter) -> Result<Vec<DepartmentCount>>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_school_id(&self, school_id: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user(&self, id: i64, update: &UserUpdate) -> Result<bool>;
    fn set_user_password(&self, id: i64, password_hash: &str) -> Result<bool>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn has_admin(&self) -> Result<bool>;
    /// Department name of a user, or None if the user has no department.
    fn user_office(&self, user_id: i64) -> Result<Option<String>>;

    // Record operations
    fn create_record(&self, record: &NewRecord) -> Result<Record>;
    fn get_record(&self, id: i64, filter: &Filter) -> Result<Option<Record>>;
    fn list_records(&self, filter: &Filter) -> Result<Vec<Record>>;
    fn update_record(&self, id: i64, fields: &RecordFields, filter: &Filter) -> Result<bool>;
    fn delete_record(&self, id: i64, filter: &Filter) -> Result<bool>;
    fn list_disposal_due(&self, today: NaiveDate, filter: &Filter) -> Result<Vec<Record>>;
    fn list_public_documents(&self, filter: &Filter) -> Result<Vec<Record>>;

    // Record file operations (filtered by the owning record's department)
    fn create_record_file(&self, file: &NewRecordFile) -> Result<RecordFile>;
    fn get_record_file(&self, id: i64, filter: &Filter) -> Result<Option<RecordFile>>;
    fn list_record_files(&self, record_id: i64, filter: &Filter) -> Result<Vec<RecordFile>>;
    fn delete_record_file(&self, id: i64, filter: &Filter) -> Result<bool>;

    // Document request operations
    fn create_request(&self, request: &NewDocumentRequest) -> Result<DocumentRequest>;
    fn get_request(&self, id: i64, filter: &Filter) -> Result<Option<DocumentRequest>>;
    fn list_requests(&self, filter: &Filter) -> Result<Vec<DocumentRequest>>;
    /// Moves a pending request to `status`. Returns false, changing nothing,
    /// if the request is missing or already decided.
    fn decide_request(
        &self,
        id: i64,
        status: RequestStatus,
        approver_user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    // Activity log operations (append-only)
    fn append_activity(&self, entry: &NewActivity) -> Result<()>;
    fn list_activity(&self, filter: &Filter, limit: i64) -> Result<Vec<ActivityLogEntry>>;
}
