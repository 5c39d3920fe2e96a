use crate::audit::{Event, Operation};
use crate::error::{Error, Result};
use crate::policy::{self, Action, Resource};
use crate::server::AppState;
use crate::store::UserUpdate;
use crate::types::{NewUser, Principal, Role, User};

/// Account details supplied by an admin when creating a user.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub school_id: String,
    pub password: String,
    pub full_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i64>,
}

fn check_email(email: &str) -> Result<String> {
    let email = super::non_empty("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::InvalidInput(format!("'{email}' is not a valid email"))),
    }
}

/// Every non-admin must belong to an existing department.
fn check_department(state: &AppState, role: Role, department_id: Option<i64>) -> Result<()> {
    match department_id {
        Some(id) => {
            if state.store.get_department(id)?.is_none() {
                return Err(Error::InvalidInput("Department does not exist".to_string()));
            }
        }
        None if !role.is_admin() => {
            return Err(Error::InvalidInput(format!(
                "department_id is required for role {role}"
            )));
        }
        None => {}
    }
    Ok(())
}

fn clean_name(full_name: Option<String>) -> Option<String> {
    full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

pub fn list(state: &AppState, principal: &Principal) -> Result<Vec<User>> {
    policy::decide(principal, Resource::Users, Action::List).into_filter()?;
    state.store.list_users()
}

pub fn create(state: &AppState, principal: &Principal, account: NewAccount) -> Result<User> {
    policy::decide(principal, Resource::Users, Action::Create).into_filter()?;

    let school_id = super::non_empty("school_id", &account.school_id)?;
    let email = check_email(&account.email)?;
    state.config.password_policy.check(&account.password)?;
    check_department(state, account.role, account.department_id)?;

    let user = state.store.create_user(&NewUser {
        school_id,
        password_hash: state.hasher.hash(&account.password)?,
        full_name: clean_name(account.full_name),
        email,
        role: account.role,
        department_id: account.department_id,
    })?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Create)
            .details(&format!("User: {}", user.school_id)),
    );
    Ok(user)
}

pub fn update(
    state: &AppState,
    principal: &Principal,
    id: i64,
    update: UserUpdate,
) -> Result<User> {
    policy::decide(principal, Resource::Users, Action::Update).into_filter()?;

    let update = UserUpdate {
        full_name: clean_name(update.full_name),
        email: check_email(&update.email)?,
        ..update
    };
    check_department(state, update.role, update.department_id)?;

    if !state.store.update_user(id, &update)? {
        return Err(Error::NotFound);
    }
    let user = state.store.get_user(id)?.ok_or(Error::NotFound)?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Update)
            .details(&format!("User: {}", user.school_id)),
    );
    Ok(user)
}

pub fn delete(state: &AppState, principal: &Principal, id: i64) -> Result<()> {
    policy::decide(principal, Resource::Users, Action::Delete).into_filter()?;
    let user = state.store.get_user(id)?.ok_or(Error::NotFound)?;

    if !state.store.delete_user(id)? {
        return Err(Error::NotFound);
    }

    state.audit.record(
        Event::new(principal.user_id, Operation::Delete)
            .details(&format!("User: {}", user.school_id)),
    );
    Ok(())
}

pub fn reset_password(
    state: &AppState,
    principal: &Principal,
    id: i64,
    new_password: &str,
) -> Result<()> {
    policy::decide(principal, Resource::Users, Action::Update).into_filter()?;
    state.config.password_policy.check(new_password)?;

    let user = state.store.get_user(id)?.ok_or(Error::NotFound)?;
    let hash = state.hasher.hash(new_password)?;
    if !state.store.set_user_password(id, &hash)? {
        return Err(Error::NotFound);
    }

    state.audit.record(
        Event::new(principal.user_id, Operation::PasswordReset)
            .details(&format!("User: {}", user.school_id)),
    );
    Ok(())
}
