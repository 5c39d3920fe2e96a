use crate::audit::{Event, Operation};
use crate::error::{Error, Result};
use crate::policy::{self, Action, Resource};
use crate::server::AppState;
use crate::types::{Department, DepartmentCount, Principal};

pub fn list(state: &AppState, principal: &Principal) -> Result<Vec<Department>> {
    policy::decide(principal, Resource::Departments, Action::List).into_filter()?;
    state.store.list_departments()
}

pub fn create(state: &AppState, principal: &Principal, name: &str) -> Result<Department> {
    policy::decide(principal, Resource::Departments, Action::Create).into_filter()?;
    let name = super::non_empty("name", name)?;

    let department = state.store.create_department(&name)?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Create)
            .details(&format!("Department: {}", department.name)),
    );
    Ok(department)
}

pub fn update(state: &AppState, principal: &Principal, id: i64, name: &str) -> Result<Department> {
    policy::decide(principal, Resource::Departments, Action::Update).into_filter()?;
    let name = super::non_empty("name", name)?;

    if !state.store.update_department(id, &name)? {
        return Err(Error::NotFound);
    }

    state.audit.record(
        Event::new(principal.user_id, Operation::Update).details(&format!("Department: {name}")),
    );
    Ok(Department { id, name })
}

/// Fails with `Conflict` while users or records still reference the department.
pub fn delete(state: &AppState, principal: &Principal, id: i64) -> Result<()> {
    policy::decide(principal, Resource::Departments, Action::Delete).into_filter()?;
    let department = state.store.get_department(id)?.ok_or(Error::NotFound)?;

    if !state.store.delete_department(id)? {
        return Err(Error::NotFound);
    }

    state.audit.record(
        Event::new(principal.user_id, Operation::Delete)
            .details(&format!("Department: {}", department.name)),
    );
    Ok(())
}

/// Record counts per department, zero-count departments included.
pub fn analytics(state: &AppState, principal: &Principal) -> Result<Vec<DepartmentCount>> {
    let filter = policy::decide(principal, Resource::Analytics, Action::List).into_filter()?;
    state.store.department_counts(&filter)
}
