use chrono::Utc;

use crate::audit::{Event, Operation};
use crate::error::{Error, Result};
use crate::policy::{self, Action, Filter, Resource};
use crate::server::AppState;
use crate::types::{DocumentRequest, NewDocumentRequest, Principal, RequestStatus};

pub fn list(state: &AppState, principal: &Principal) -> Result<Vec<DocumentRequest>> {
    let filter = policy::decide(principal, Resource::Requests, Action::List).into_filter()?;
    state.store.list_requests(&filter)
}

/// Files a request for a copy of a record. Any authenticated user may ask
/// for any existing record; the decision is left to an admin.
pub fn create(
    state: &AppState,
    principal: &Principal,
    record_id: i64,
    purpose: &str,
    id_document_path: Option<String>,
) -> Result<DocumentRequest> {
    policy::decide(principal, Resource::Requests, Action::Create).into_filter()?;
    let purpose = super::non_empty("purpose", purpose)?;

    let record = state
        .store
        .get_record(record_id, &Filter::unrestricted())?
        .ok_or(Error::NotFound)?;

    let request = state.store.create_request(&NewDocumentRequest {
        record_id,
        requester_user_id: principal.user_id,
        purpose,
        id_document_path: id_document_path.filter(|p| !p.trim().is_empty()),
    })?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Request)
            .record(&record.fields.record_series_title_description),
    );
    Ok(request)
}

/// Approves or denies a pending request.
///
/// `status` must be `Approved` or `Denied`. A request that was already
/// decided is left untouched and yields `Conflict`.
pub fn decide(
    state: &AppState,
    principal: &Principal,
    id: i64,
    status: &str,
) -> Result<DocumentRequest> {
    let filter = policy::decide(principal, Resource::Requests, Action::Decide).into_filter()?;

    let status = RequestStatus::parse(status.trim())
        .filter(|s| s.is_terminal())
        .ok_or_else(|| {
            Error::InvalidInput("status must be 'Approved' or 'Denied'".to_string())
        })?;

    let current = state.store.get_request(id, &filter)?.ok_or(Error::NotFound)?;
    if !current.status.can_transition_to(status) {
        return Err(Error::Conflict(format!(
            "Request has already been {}",
            current.status.as_str().to_lowercase()
        )));
    }

    // The store only moves rows that are still pending, so a concurrent
    // decision makes this a no-op.
    if !state
        .store
        .decide_request(id, status, principal.user_id, Utc::now())?
    {
        return Err(Error::Conflict("Request has already been decided".to_string()));
    }

    let operation = match status {
        RequestStatus::Approved => Operation::Approve,
        _ => Operation::Deny,
    };
    let mut event = Event::new(principal.user_id, operation);
    if let Some(title) = current.record_series_title_description.as_deref() {
        event = event.record(title);
    }
    state.audit.record(event);

    state.store.get_request(id, &filter)?.ok_or(Error::NotFound)
}
