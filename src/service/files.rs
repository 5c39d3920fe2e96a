use tokio::fs::File;
use tokio::io::BufReader;

use crate::audit::{Event, Operation};
use crate::error::{Error, Result};
use crate::policy::{self, Action, Resource};
use crate::server::AppState;
use crate::types::{NewRecordFile, Principal, RecordFile};

/// The error for a file larger than `max` bytes.
#[must_use]
pub fn oversize(max: usize) -> Error {
    Error::InvalidInput(format!("File exceeds the maximum upload size of {max} bytes"))
}

fn check_size(state: &AppState, size: usize) -> Result<()> {
    let max = state.config.max_upload_bytes;
    if size > max {
        return Err(oversize(max));
    }
    Ok(())
}

/// The largest accepted upload, for callers that stream the body.
#[must_use]
pub fn max_upload_bytes(state: &AppState) -> usize {
    state.config.max_upload_bytes
}

/// Attaches a file to a record in the caller's scope.
///
/// The blob is written before the metadata row. If the row cannot be
/// inserted the blob is left behind and logged.
pub async fn upload(
    state: &AppState,
    principal: &Principal,
    record_id: i64,
    file_name: &str,
    data: &[u8],
) -> Result<RecordFile> {
    let filter = policy::decide(principal, Resource::Files, Action::Create).into_filter()?;
    let file_name = super::non_empty("file name", file_name)?;
    if data.is_empty() {
        return Err(Error::InvalidInput("file is empty".to_string()));
    }
    check_size(state, data.len())?;

    let record = state
        .store
        .get_record(record_id, &filter)?
        .ok_or(Error::NotFound)?;

    let stored_path = state.storage.put(&file_name, data).await?;

    let file = state
        .store
        .create_record_file(&NewRecordFile {
            record_id,
            file_name,
            stored_path: stored_path.clone(),
            file_size: data.len() as i64,
            uploaded_by_user_id: principal.user_id,
        })
        .inspect_err(|e| {
            tracing::warn!(
                stored_path = %stored_path,
                "Orphaned upload, metadata insert failed: {e}"
            );
        })?;

    state.audit.record(
        Event::new(principal.user_id, Operation::Upload)
            .record(&record.fields.record_series_title_description)
            .details(&file.file_name),
    );
    Ok(file)
}

pub fn list(state: &AppState, principal: &Principal, record_id: i64) -> Result<Vec<RecordFile>> {
    let filter = policy::decide(principal, Resource::Files, Action::List).into_filter()?;
    state
        .store
        .get_record(record_id, &filter)?
        .ok_or(Error::NotFound)?;
    state.store.list_record_files(record_id, &filter)
}

/// Opens a stored file for download.
pub async fn open(
    state: &AppState,
    principal: &Principal,
    id: i64,
) -> Result<(RecordFile, BufReader<File>, u64)> {
    let filter = policy::decide(principal, Resource::Files, Action::Read).into_filter()?;
    let file = state
        .store
        .get_record_file(id, &filter)?
        .ok_or(Error::NotFound)?;
    let (reader, size) = state.storage.get(&file.stored_path).await?;
    Ok((file, reader, size))
}

/// Removes a file's metadata and then its blob. A blob that is already gone
/// is not an error.
pub async fn delete(state: &AppState, principal: &Principal, id: i64) -> Result<()> {
    let filter = policy::decide(principal, Resource::Files, Action::Delete).into_filter()?;
    let file = state
        .store
        .get_record_file(id, &filter)?
        .ok_or(Error::NotFound)?;

    if !state.store.delete_record_file(id, &filter)? {
        return Err(Error::NotFound);
    }

    match state.storage.delete(&file.stored_path).await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(stored_path = %file.stored_path, "Blob was already missing"),
        Err(e) => tracing::warn!(stored_path = %file.stored_path, "Failed to remove blob: {e}"),
    }

    let title = state
        .store
        .get_record(file.record_id, &filter)?
        .map(|r| r.fields.record_series_title_description);
    let mut event = Event::new(principal.user_id, Operation::Delete).details(&file.file_name);
    if let Some(title) = title.as_deref() {
        event = event.record(title);
    }
    state.audit.record(event);

    Ok(())
}
