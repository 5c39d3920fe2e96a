use crate::audit::{Event, Operation};
use crate::auth::SessionClaims;
use crate::error::{Error, Result};
use crate::server::AppState;
use crate::types::{Principal, User};

/// Checks a school ID and password and issues a session token.
///
/// Unknown accounts and wrong passwords fail identically with
/// `InvalidCredentials` and leave no audit entry.
pub fn login(state: &AppState, school_id: &str, password: &str) -> Result<(String, User)> {
    let school_id = super::non_empty("school_id", school_id)?;
    if password.is_empty() {
        return Err(Error::InvalidInput("password is required".to_string()));
    }

    let user = state
        .store
        .get_user_by_school_id(&school_id)?
        .ok_or(Error::InvalidCredentials)?;

    if !state.hasher.verify(password, &user.password_hash)? {
        tracing::debug!(school_id = %school_id, "Rejected login");
        return Err(Error::InvalidCredentials);
    }

    let token = state.codec.issue(SessionClaims {
        user_id: user.id,
        school_id: user.school_id.clone(),
        role: user.role,
        department_id: user.department_id,
        full_name: user.full_name.clone(),
    })?;

    state.audit.record(Event::new(user.id, Operation::Login));

    Ok((token, user))
}

/// The caller's own account. A token that outlived its account is `NotFound`.
pub fn profile(state: &AppState, principal: &Principal) -> Result<User> {
    state
        .store
        .get_user(principal.user_id)?
        .ok_or(Error::NotFound)
}

pub fn change_password(
    state: &AppState,
    principal: &Principal,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    if old_password.is_empty() {
        return Err(Error::InvalidInput("old_password is required".to_string()));
    }
    state.config.password_policy.check(new_password)?;

    let user = profile(state, principal)?;
    if !state.hasher.verify(old_password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    let hash = state.hasher.hash(new_password)?;
    if !state.store.set_user_password(user.id, &hash)? {
        return Err(Error::NotFound);
    }

    state
        .audit
        .record(Event::new(user.id, Operation::PasswordChange));
    Ok(())
}
