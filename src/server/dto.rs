use serde::{Deserialize, Serialize};

use super::validation::{Required, optional_text, parse_date, parse_role, parse_time_value};
use crate::error::Result;
use crate::service::users::NewAccount;
use crate::store::UserUpdate;
use crate::types::{RecordFields, User};

// Account

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub school_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

// Records

/// Create/update body for a record. Every field is optional at the JSON
/// level so missing ones can be reported together.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPayload {
    pub record_series_title_description: Option<String>,
    pub period_covered: Option<String>,
    pub volume: Option<String>,
    pub record_medium: Option<String>,
    pub restrictions: Option<String>,
    pub location: Option<String>,
    pub frequency_of_use: Option<String>,
    pub duplication: Option<String>,
    pub time_value: Option<String>,
    pub utility_value: Option<String>,
    pub retention_period_active: Option<i32>,
    pub retention_period_storage: Option<i32>,
    pub retention_period_total: Option<i32>,
    pub disposition_provision: Option<String>,
    pub date_of_record: Option<String>,
    /// Honoured for admins only.
    pub department_id: Option<i64>,
}

impl RecordPayload {
    pub fn into_fields(self) -> Result<(RecordFields, Option<i64>)> {
        let mut required = Required::new();
        let title = required.text(
            "record_series_title_description",
            self.record_series_title_description,
        );
        let time_value = required.text("time_value", self.time_value);
        required.finish()?;

        let date_of_record = optional_text(self.date_of_record)
            .map(|d| parse_date("date_of_record", &d))
            .transpose()?;

        let fields = RecordFields {
            record_series_title_description: title,
            period_covered: optional_text(self.period_covered),
            volume: optional_text(self.volume),
            record_medium: optional_text(self.record_medium),
            restrictions: optional_text(self.restrictions),
            location: optional_text(self.location),
            frequency_of_use: optional_text(self.frequency_of_use),
            duplication: optional_text(self.duplication),
            time_value: parse_time_value(&time_value)?,
            utility_value: optional_text(self.utility_value),
            retention_period_active: self.retention_period_active,
            retention_period_storage: self.retention_period_storage,
            retention_period_total: self.retention_period_total,
            disposition_provision: optional_text(self.disposition_provision),
            date_of_record,
        };
        Ok((fields, self.department_id))
    }
}

// Departments

#[derive(Debug, Deserialize)]
pub struct DepartmentPayload {
    pub name: Option<String>,
}

impl DepartmentPayload {
    pub fn into_name(self) -> Result<String> {
        let mut required = Required::new();
        let name = required.text("name", self.name);
        required.finish()?;
        Ok(name)
    }
}

// Users

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub school_id: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department_id: Option<i64>,
}

impl CreateUserRequest {
    pub fn into_account(self) -> Result<NewAccount> {
        let mut required = Required::new();
        let school_id = required.text("school_id", self.school_id);
        let password = required.value("password", self.password.filter(|p| !p.is_empty()));
        let email = required.text("email", self.email);
        let role = required.text("role", self.role);
        required.finish()?;

        Ok(NewAccount {
            school_id,
            password: password.unwrap_or_default(),
            full_name: self.full_name,
            email,
            role: parse_role(&role)?,
            department_id: self.department_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department_id: Option<i64>,
}

impl UpdateUserRequest {
    pub fn into_update(self) -> Result<UserUpdate> {
        let mut required = Required::new();
        let email = required.text("email", self.email);
        let role = required.text("role", self.role);
        required.finish()?;

        Ok(UserUpdate {
            full_name: self.full_name,
            email,
            role: parse_role(&role)?,
            department_id: self.department_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: Option<String>,
}

// Document requests

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub record_id: Option<i64>,
    pub purpose: Option<String>,
    pub id_document_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub status: Option<String>,
}
