use crate::error::Result;
use crate::policy::{self, Action, Resource};
use crate::server::AppState;
use crate::types::{ActivityLogEntry, Principal};

/// Most entries returned by one listing.
pub const LIST_LIMIT: i64 = 1000;

/// Audit entries, newest first. Custodians see entries by users of their own
/// department; staff may not read the trail at all.
pub fn list(state: &AppState, principal: &Principal) -> Result<Vec<ActivityLogEntry>> {
    let filter = policy::decide(principal, Resource::ActivityLogs, Action::List).into_filter()?;
    state.store.list_activity(&filter, LIST_LIMIT)
}
