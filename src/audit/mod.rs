//! Best-effort audit trail.
//!
//! [`AuditRecorder::record`] never fails: a broken append is logged and the
//! operation that triggered it still succeeds.

use std::fmt;
use std::sync::Arc;

use crate::store::Store;
use crate::types::NewActivity;

/// Office recorded for users without a department.
pub const ADMIN_OFFICE: &str = "Admin Office";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    PasswordChange,
    PasswordReset,
    Create,
    Update,
    Delete,
    Upload,
    Request,
    Approve,
    Deny,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Login => "Login",
            Operation::PasswordChange => "Password Change",
            Operation::PasswordReset => "Password Reset",
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::Upload => "Upload",
            Operation::Request => "Request",
            Operation::Approve => "Approve",
            Operation::Deny => "Deny",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit entry before the office is resolved.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    pub user_id: i64,
    pub operation: Operation,
    /// Series title of the record the operation touched, if any.
    pub record_title: Option<&'a str>,
    pub details: Option<&'a str>,
}

impl<'a> Event<'a> {
    #[must_use]
    pub fn new(user_id: i64, operation: Operation) -> Self {
        Self {
            user_id,
            operation,
            record_title: None,
            details: None,
        }
    }

    #[must_use]
    pub fn record(mut self, title: &'a str) -> Self {
        self.record_title = Some(title);
        self
    }

    #[must_use]
    pub fn details(mut self, details: &'a str) -> Self {
        self.details = Some(details);
        self
    }
}

pub struct AuditRecorder {
    store: Arc<dyn Store>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn record(&self, event: Event<'_>) {
        let office = match self.store.user_office(event.user_id) {
            Ok(Some(office)) => office,
            Ok(None) => ADMIN_OFFICE.to_string(),
            Err(e) => {
                tracing::warn!(
                    user_id = event.user_id,
                    "Failed to resolve office for audit entry: {e}"
                );
                ADMIN_OFFICE.to_string()
            }
        };

        let entry = NewActivity {
            user_id: event.user_id,
            office,
            operation: event.operation.as_str().to_string(),
            record_series_title_description: event.record_title.map(str::to_string),
            details: event.details.map(str::to_string),
        };

        if let Err(e) = self.store.append_activity(&entry) {
            tracing::warn!(
                user_id = event.user_id,
                operation = %event.operation,
                "Failed to append audit entry: {e}"
            );
        }
    }
}
