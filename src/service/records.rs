use chrono::Utc;

use crate::audit::{Event, Operation};
use crate::error::{Error, Result};
use crate::policy::{self, Action, Resource};
use crate::server::AppState;
use crate::types::{NewRecord, Principal, Record, RecordFields, RecordWithFiles};

fn validate(fields: RecordFields) -> Result<RecordFields> {
    let title = super::non_empty(
        "record_series_title_description",
        &fields.record_series_title_description,
    )?;

    for (name, value) in [
        ("retention_period_active", fields.retention_period_active),
        ("retention_period_storage", fields.retention_period_storage),
        ("retention_period_total", fields.retention_period_total),
    ] {
        if value.is_some_and(|years| years < 0) {
            return Err(Error::InvalidInput(format!("{name} must not be negative")));
        }
    }

    Ok(RecordFields {
        record_series_title_description: title,
        ..fields
    })
}

pub fn list(state: &AppState, principal: &Principal) -> Result<Vec<Record>> {
    let filter = policy::decide(principal, Resource::Records, Action::List).into_filter()?;
    state.store.list_records(&filter)
}

/// A single record with its attached files.
pub fn get(state: &AppState, principal: &Principal, id: i64) -> Result<RecordWithFiles> {
    let filter = policy::decide(principal, Resource::Records, Action::Read).into_filter()?;
    let record = state.store.get_record(id, &filter)?.ok_or(Error::NotFound)?;
    let files = state.store.list_record_files(id, &filter)?;
    Ok(RecordWithFiles { record, files })
}

/// Creates a record. Non-admins always write into their own department;
/// `department_id` is honoured only for admins.
pub fn create(
    state: &AppState,
    principal: &Principal,
    fields: RecordFields,
    department_id: Option<i64>,
) -> Result<Record> {
    policy::decide(principal, Resource::Records, Action::Create).into_filter()?;
    let fields = validate(fields)?;
    let department_id = policy::record_target_department(principal, department_id)?;

    let record = state.store.create_record(&NewRecord {
        fields,
        department_id,
        created_by_user_id: principal.user_id,
    })?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Create)
            .record(&record.fields.record_series_title_description),
    );
    Ok(record)
}

pub fn update(
    state: &AppState,
    principal: &Principal,
    id: i64,
    fields: RecordFields,
) -> Result<Record> {
    let filter = policy::decide(principal, Resource::Records, Action::Update).into_filter()?;
    let fields = validate(fields)?;

    if !state.store.update_record(id, &fields, &filter)? {
        return Err(Error::NotFound);
    }
    let record = state.store.get_record(id, &filter)?.ok_or(Error::NotFound)?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Update)
            .record(&record.fields.record_series_title_description),
    );
    Ok(record)
}

/// Deletes a record along with its file rows and their blobs.
pub async fn delete(state: &AppState, principal: &Principal, id: i64) -> Result<()> {
    let filter = policy::decide(principal, Resource::Records, Action::Delete).into_filter()?;
    let record = state.store.get_record(id, &filter)?.ok_or(Error::NotFound)?;
    let files = state.store.list_record_files(id, &filter)?;

    if !state.store.delete_record(id, &filter)? {
        return Err(Error::NotFound);
    }

    for file in files {
        if let Err(e) = state.storage.delete(&file.stored_path).await {
            tracing::warn!(
                stored_path = %file.stored_path,
                "Failed to remove blob of deleted record {id}: {e}"
            );
        }
    }

    state.audit.record(
        Event::new(principal.user_id, Operation::Delete)
            .record(&record.fields.record_series_title_description),
    );
    Ok(())
}

/// Temporary records whose disposal date is today or earlier, oldest first.
pub fn disposal_reminders(state: &AppState, principal: &Principal) -> Result<Vec<Record>> {
    let filter = policy::decide(principal, Resource::Records, Action::List).into_filter()?;
    state
        .store
        .list_disposal_due(Utc::now().date_naive(), &filter)
}

pub fn public_documents(state: &AppState, principal: &Principal) -> Result<Vec<Record>> {
    let filter =
        policy::decide(principal, Resource::PublicDocuments, Action::List).into_filter()?;
    state.store.list_public_documents(&filter)
}
