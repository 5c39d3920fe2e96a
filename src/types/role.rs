use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role. The serialized names are the ones stored in the database
/// and embedded in session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[serde(rename = "Departmental Record Custodian", alias = "Custodian")]
    Custodian,
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Custodian, Role::Staff];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Custodian => "Departmental Record Custodian",
            Role::Staff => "Staff",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Admin" => Some(Role::Admin),
            "Departmental Record Custodian" | "Custodian" => Some(Role::Custodian),
            "Staff" => Some(Role::Staff),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a document request. `Approved` and `Denied` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Denied => "Denied",
        }
    }

    pub fn parse(s: &str) -> Option<RequestStatus> {
        match s {
            "Pending" => Some(RequestStatus::Pending),
            "Approved" => Some(RequestStatus::Approved),
            "Denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Returns true if a request in this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(self, RequestStatus::Pending) && next.is_terminal()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retention classification: temporary records are scheduled for disposal,
/// permanent ones are kept indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeValue {
    #[serde(rename = "T")]
    Temporary,
    #[serde(rename = "P")]
    Permanent,
}

impl TimeValue {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TimeValue::Temporary => "T",
            TimeValue::Permanent => "P",
        }
    }

    pub fn parse(s: &str) -> Option<TimeValue> {
        match s {
            "T" => Some(TimeValue::Temporary),
            "P" => Some(TimeValue::Permanent),
            _ => None,
        }
    }
}
