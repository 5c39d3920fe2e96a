//! Role and department scoping.
//!
//! [`decide`] is the one place that maps a caller's role onto what it may see
//! and change. Services ask it for a [`Scope`] and push the resulting
//! [`Filter`] into every storage call; they never branch on roles themselves.

mod filter;

pub use filter::{Filter, Predicate};

use crate::error::{Error, Result};
use crate::types::{Principal, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Records,
    Analytics,
    ActivityLogs,
    Departments,
    Users,
    Requests,
    PublicDocuments,
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
    /// Approve or deny a document request.
    Decide,
}

/// What a caller may do with a resource: whether the action is permitted at
/// all, and which rows it is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub allowed: bool,
    pub filter: Filter,
}

impl Scope {
    fn open() -> Self {
        Self {
            allowed: true,
            filter: Filter::unrestricted(),
        }
    }

    fn denied() -> Self {
        Self {
            allowed: false,
            filter: Filter::unrestricted(),
        }
    }

    fn within(filter: Filter) -> Self {
        Self {
            allowed: true,
            filter,
        }
    }

    /// Returns the row filter, or `Forbidden` if the action is not permitted.
    pub fn into_filter(self) -> Result<Filter> {
        if !self.allowed {
            return Err(Error::Forbidden);
        }
        Ok(self.filter)
    }
}

/// The scoping table.
#[must_use]
pub fn decide(principal: &Principal, resource: Resource, action: Action) -> Scope {
    let role = principal.role;
    if role == Role::Admin {
        return Scope::open();
    }

    let own_department = || Scope::within(Filter::department(principal.department_id));

    match (resource, action) {
        (Resource::Records, Action::Create) => Scope::open(),
        (Resource::Records, Action::Delete) => match role {
            Role::Custodian => own_department(),
            _ => Scope::denied(),
        },
        (
            Resource::Records | Resource::Files,
            Action::List | Action::Read | Action::Create | Action::Update | Action::Delete,
        ) => own_department(),
        (Resource::Analytics, Action::List | Action::Read) => own_department(),
        (Resource::ActivityLogs, Action::List | Action::Read) => match role {
            Role::Custodian => own_department(),
            _ => Scope::denied(),
        },
        (Resource::Departments, Action::List | Action::Read) => Scope::open(),
        (Resource::Requests, Action::Create) => Scope::open(),
        (Resource::Requests, Action::List | Action::Read) => {
            Scope::within(Filter::owner(principal.user_id))
        }
        (Resource::PublicDocuments, Action::List | Action::Read) => match role {
            Role::Staff => own_department(),
            _ => Scope::open(),
        },
        _ => Scope::denied(),
    }
}

/// The department a new record is written into. Admins choose it; everyone
/// else always writes into their own department, whatever the payload says.
pub fn record_target_department(principal: &Principal, requested: Option<i64>) -> Result<i64> {
    if principal.is_admin() {
        return requested
            .ok_or_else(|| Error::InvalidInput("department_id is required".to_string()));
    }
    principal.department_id.ok_or(Error::Forbidden)
}
