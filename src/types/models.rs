use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{RequestStatus, Role, TimeValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub school_id: String,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub school_id: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i64>,
}

/// The user-editable descriptive and retention metadata of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub record_series_title_description: String,
    pub period_covered: Option<String>,
    pub volume: Option<String>,
    pub record_medium: Option<String>,
    pub restrictions: Option<String>,
    pub location: Option<String>,
    pub frequency_of_use: Option<String>,
    pub duplication: Option<String>,
    pub time_value: TimeValue,
    pub utility_value: Option<String>,
    pub retention_period_active: Option<i32>,
    pub retention_period_storage: Option<i32>,
    pub retention_period_total: Option<i32>,
    pub disposition_provision: Option<String>,
    pub date_of_record: Option<NaiveDate>,
}

impl RecordFields {
    /// The date a temporary record becomes due for disposal review:
    /// `date_of_record` plus the total retention period in years.
    /// Permanent records, and records missing either input, have none.
    #[must_use]
    pub fn disposal_date(&self) -> Option<NaiveDate> {
        if self.time_value == TimeValue::Permanent {
            return None;
        }
        let start = self.date_of_record?;
        let years = u32::try_from(self.retention_period_total?).ok()?;
        start.checked_add_months(Months::new(years.checked_mul(12)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub fields: RecordFields,
    pub calculated_disposal_date: Option<NaiveDate>,
    pub department_id: i64,
    pub department_name: Option<String>,
    pub created_by_user_id: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRecord {
    pub fields: RecordFields,
    pub department_id: i64,
    pub created_by_user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWithFiles {
    #[serde(flatten)]
    pub record: Record,
    pub files: Vec<RecordFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFile {
    pub id: i64,
    pub record_id: i64,
    pub file_name: String,
    #[serde(rename = "file_path")]
    pub stored_path: String,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    pub uploaded_by_user_id: Option<i64>,
    pub uploaded_by_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRecordFile {
    pub record_id: i64,
    pub file_name: String,
    pub stored_path: String,
    pub file_size: i64,
    pub uploaded_by_user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: i64,
    pub record_id: i64,
    pub requester_user_id: i64,
    pub purpose: String,
    pub id_document_path: Option<String>,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
    pub approval_date: Option<DateTime<Utc>>,
    pub approver_user_id: Option<i64>,
    pub record_series_title_description: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub requester_department: Option<String>,
    pub approver_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDocumentRequest {
    pub record_id: i64,
    pub requester_user_id: i64,
    pub purpose: String,
    pub id_document_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub office: String,
    pub operation: String,
    pub record_series_title_description: Option<String>,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_name: Option<String>,
    pub school_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i64,
    pub office: String,
    pub operation: String,
    pub record_series_title_description: Option<String>,
    pub details: Option<String>,
}

/// Per-department record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub document_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(time_value: TimeValue, date: Option<&str>, total: Option<i32>) -> RecordFields {
        RecordFields {
            record_series_title_description: "Payroll".to_string(),
            period_covered: None,
            volume: None,
            record_medium: None,
            restrictions: None,
            location: None,
            frequency_of_use: None,
            duplication: None,
            time_value,
            utility_value: None,
            retention_period_active: None,
            retention_period_storage: None,
            retention_period_total: total,
            disposition_provision: None,
            date_of_record: date.map(|d| d.parse().unwrap()),
        }
    }

    #[test]
    fn test_temporary_record_disposal_date() {
        let f = fields(TimeValue::Temporary, Some("2020-03-15"), Some(5));
        assert_eq!(f.disposal_date(), Some("2025-03-15".parse().unwrap()));
    }

    #[test]
    fn test_leap_day_clamps_to_month_end() {
        let f = fields(TimeValue::Temporary, Some("2020-02-29"), Some(1));
        assert_eq!(f.disposal_date(), Some("2021-02-28".parse().unwrap()));
    }

    #[test]
    fn test_permanent_record_has_no_disposal_date() {
        let f = fields(TimeValue::Permanent, Some("2020-03-15"), Some(5));
        assert_eq!(f.disposal_date(), None);
    }

    #[test]
    fn test_missing_inputs_have_no_disposal_date() {
        assert_eq!(fields(TimeValue::Temporary, None, Some(5)).disposal_date(), None);
        assert_eq!(
            fields(TimeValue::Temporary, Some("2020-03-15"), None).disposal_date(),
            None
        );
        assert_eq!(
            fields(TimeValue::Temporary, Some("2020-03-15"), Some(-1)).disposal_date(),
            None
        );
    }

    #[test]
    fn test_zero_retention_is_due_immediately() {
        let f = fields(TimeValue::Temporary, Some("2020-03-15"), Some(0));
        assert_eq!(f.disposal_date(), Some("2020-03-15".parse().unwrap()));
    }
}
