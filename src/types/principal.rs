use serde::Serialize;

use super::Role;

/// The caller identity recovered from a verified session token.
/// Lives for one request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: i64,
    pub school_id: String,
    pub role: Role,
    pub department_id: Option<i64>,
    pub full_name: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl Principal {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}
