use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, ffi, params, params_from_iter};

use super::filter::{ScopeColumns, render};
use super::schema::SCHEMA;
use super::{Store, UserUpdate};
use crate::error::{Error, Result};
use crate::policy::Filter;
use crate::types::*;

const USER_SELECT: &str = "SELECT u.id, u.school_id, u.password_hash, u.full_name, u.email, u.role,
        u.department_id, d.name, u.created_at
     FROM users u
     LEFT JOIN departments d ON u.department_id = d.id";

const FILE_SELECT: &str = "SELECT rf.id, rf.record_id, rf.file_name, rf.stored_path, rf.file_size,
        rf.upload_date, rf.uploaded_by_user_id, u.full_name
     FROM record_files rf
     JOIN records r ON rf.record_id = r.id
     LEFT JOIN users u ON rf.uploaded_by_user_id = u.id
     WHERE 1=1";

const REQUEST_SELECT: &str = "SELECT dr.id, dr.record_id, dr.requester_user_id, dr.purpose,
        dr.id_document_path, dr.status, dr.request_date, dr.approval_date, dr.approver_user_id,
        r.record_series_title_description, u.full_name, u.email, d.name, a.full_name
     FROM document_requests dr
     LEFT JOIN records r ON dr.record_id = r.id
     LEFT JOIN users u ON dr.requester_user_id = u.id
     LEFT JOIN departments d ON u.department_id = d.id
     LEFT JOIN users a ON dr.approver_user_id = a.id
     WHERE 1=1";

const ACTIVITY_SELECT: &str = "SELECT al.id, al.user_id, al.office, al.operation,
        al.record_series_title_description, al.details, al.action_date_time,
        u.full_name, u.school_id
     FROM activity_logs al
     LEFT JOIN users u ON al.user_id = u.id
     WHERE 1=1";

const RECORD_SCOPE: ScopeColumns = ScopeColumns::department("r.department_id");
const REQUEST_SCOPE: ScopeColumns = ScopeColumns::owner("dr.requester_user_id");
const ACTIVITY_SCOPE: ScopeColumns = ScopeColumns::department("u.department_id");
const ANALYTICS_SCOPE: ScopeColumns = ScopeColumns::department("d.id");

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    /// An empty private database, for tests and throwaway instances.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn query_records(&self, sql: &str, values: Vec<Value>) -> Result<Vec<Record>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(values), record_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    let s = s?;
    match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::error!("Invalid date in database: '{}' - {}", s, e);
            None
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_column<T>(idx: usize, value: String, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value '{value}'").into(),
        )
    })
}

enum Constraint {
    Unique,
    ForeignKey,
}

fn constraint_kind(e: &rusqlite::Error) -> Option<Constraint> {
    match e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            match err.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    Some(Constraint::Unique)
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Maps constraint violations on a write to the error taxonomy.
fn write_error(
    e: rusqlite::Error,
    on_unique: &str,
    on_foreign_key: fn(String) -> Error,
    fk_message: &str,
) -> Error {
    match constraint_kind(&e) {
        Some(Constraint::Unique) => Error::Conflict(on_unique.to_string()),
        Some(Constraint::ForeignKey) => on_foreign_key(fk_message.to_string()),
        None => Error::Database(e),
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        school_id: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        email: row.get(4)?,
        role: parse_column(5, row.get(5)?, Role::parse)?,
        department_id: row.get(6)?,
        department_name: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

fn record_select(source: &str) -> String {
    format!(
        "SELECT r.id, r.record_series_title_description, r.period_covered, r.volume,
            r.record_medium, r.restrictions, r.location, r.frequency_of_use, r.duplication, r.time_value,
            r.utility_value, r.retention_period_active, r.retention_period_storage,
            r.retention_period_total, r.disposition_provision, r.date_of_record,
            r.calculated_disposal_date, r.department_id, d.name, r.created_by_user_id,
            u.full_name, r.created_at, r.updated_at
         FROM {source} r
         LEFT JOIN departments d ON r.department_id = d.id
         LEFT JOIN users u ON r.created_by_user_id = u.id
         WHERE 1=1"
    )
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        fields: RecordFields {
            record_series_title_description: row.get(1)?,
            period_covered: row.get(2)?,
            volume: row.get(3)?,
            record_medium: row.get(4)?,
            restrictions: row.get(5)?,
            location: row.get(6)?,
            frequency_of_use: row.get(7)?,
            duplication: row.get(8)?,
            time_value: parse_column(9, row.get(9)?, TimeValue::parse)?,
            utility_value: row.get(10)?,
            retention_period_active: row.get(11)?,
            retention_period_storage: row.get(12)?,
            retention_period_total: row.get(13)?,
            disposition_provision: row.get(14)?,
            date_of_record: parse_date(row.get(15)?),
        },
        calculated_disposal_date: parse_date(row.get(16)?),
        department_id: row.get(17)?,
        department_name: row.get(18)?,
        created_by_user_id: row.get(19)?,
        created_by_name: row.get(20)?,
        created_at: parse_datetime(&row.get::<_, String>(21)?),
        updated_at: parse_datetime(&row.get::<_, String>(22)?),
    })
}

/// Bound values for the editable record columns, in schema order, followed
/// by the derived disposal date.
fn record_field_values(fields: &RecordFields) -> Vec<Value> {
    vec![
        Value::from(fields.record_series_title_description.clone()),
        Value::from(fields.period_covered.clone()),
        Value::from(fields.volume.clone()),
        Value::from(fields.record_medium.clone()),
        Value::from(fields.restrictions.clone()),
        Value::from(fields.location.clone()),
        Value::from(fields.frequency_of_use.clone()),
        Value::from(fields.duplication.clone()),
        Value::from(fields.time_value.as_str().to_string()),
        Value::from(fields.utility_value.clone()),
        Value::from(fields.retention_period_active),
        Value::from(fields.retention_period_storage),
        Value::from(fields.retention_period_total),
        Value::from(fields.disposition_provision.clone()),
        Value::from(fields.date_of_record.map(format_date)),
        Value::from(fields.disposal_date().map(format_date)),
    ]
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<RecordFile> {
    Ok(RecordFile {
        id: row.get(0)?,
        record_id: row.get(1)?,
        file_name: row.get(2)?,
        stored_path: row.get(3)?,
        file_size: row.get(4)?,
        upload_date: parse_datetime(&row.get::<_, String>(5)?),
        uploaded_by_user_id: row.get(6)?,
        uploaded_by_name: row.get(7)?,
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentRequest> {
    Ok(DocumentRequest {
        id: row.get(0)?,
        record_id: row.get(1)?,
        requester_user_id: row.get(2)?,
        purpose: row.get(3)?,
        id_document_path: row.get(4)?,
        status: parse_column(5, row.get(5)?, RequestStatus::parse)?,
        request_date: parse_datetime(&row.get::<_, String>(6)?),
        approval_date: row
            .get::<_, Option<String>>(7)?
            .map(|s| parse_datetime(&s)),
        approver_user_id: row.get(8)?,
        record_series_title_description: row.get(9)?,
        requester_name: row.get(10)?,
        requester_email: row.get(11)?,
        requester_department: row.get(12)?,
        approver_name: row.get(13)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityLogEntry> {
    Ok(ActivityLogEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        office: row.get(2)?,
        operation: row.get(3)?,
        record_series_title_description: row.get(4)?,
        details: row.get(5)?,
        timestamp: parse_datetime(&row.get::<_, String>(6)?),
        user_name: row.get(7)?,
        school_id: row.get(8)?,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Department operations

    fn create_department(&self, name: &str) -> Result<Department> {
        let conn = self.conn();
        conn.execute("INSERT INTO departments (name) VALUES (?1)", params![name])
            .map_err(|e| {
                write_error(e, "Department already exists", Error::InvalidInput, "")
            })?;

        Ok(Department {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn get_department(&self, id: i64) -> Result<Option<Department>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name FROM departments WHERE id = ?1",
            params![id],
            |row| {
                Ok(Department {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_departments(&self) -> Result<Vec<Department>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name FROM departments ORDER BY name ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_department(&self, id: i64, name: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute(
                "UPDATE departments SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(|e| write_error(e, "Department already exists", Error::InvalidInput, ""))?;
        Ok(rows > 0)
    }

    fn delete_department(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM departments WHERE id = ?1", params![id])
            .map_err(|e| {
                write_error(
                    e,
                    "",
                    Error::Conflict,
                    "Department is still assigned to users or records",
                )
            })?;
        Ok(rows > 0)
    }

    fn department_counts(&self, filter: &Filter) -> Result<Vec<DepartmentCount>> {
        let (scope_sql, values) = render(filter, ANALYTICS_SCOPE);
        let sql = format!(
            "SELECT d.name, COUNT(r.id)
             FROM departments d
             LEFT JOIN records r ON d.id = r.department_id
             WHERE 1=1{scope_sql}
             GROUP BY d.id, d.name
             ORDER BY d.name ASC"
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok(DepartmentCount {
                department: row.get(0)?,
                document_count: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO users
                    (school_id, password_hash, full_name, email, role, department_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.school_id,
                    user.password_hash,
                    user.full_name,
                    user.email,
                    user.role.as_str(),
                    user.department_id,
                    format_datetime(&Utc::now()),
                ],
            )
            .map_err(|e| {
                write_error(
                    e,
                    "User with this school ID or email already exists",
                    Error::InvalidInput,
                    "Department does not exist",
                )
            })?;
            conn.last_insert_rowid()
        };

        self.get_user(id)?.ok_or(Error::NotFound)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{USER_SELECT} WHERE u.id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_school_id(&self, school_id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{USER_SELECT} WHERE u.school_id = ?1"),
            params![school_id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{USER_SELECT} ORDER BY u.created_at DESC, u.id DESC"
        ))?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, id: i64, update: &UserUpdate) -> Result<bool> {
        let rows = self
            .conn()
            .execute(
                "UPDATE users SET full_name = ?1, email = ?2, role = ?3, department_id = ?4
                 WHERE id = ?5",
                params![
                    update.full_name,
                    update.email,
                    update.role.as_str(),
                    update.department_id,
                    id,
                ],
            )
            .map_err(|e| {
                write_error(
                    e,
                    "User with this email already exists",
                    Error::InvalidInput,
                    "Department does not exist",
                )
            })?;
        Ok(rows > 0)
    }

    fn set_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;
        Ok(rows > 0)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn has_admin(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            params![Role::Admin.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn user_office(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn();
        let office: Option<Option<String>> = conn
            .query_row(
                "SELECT d.name FROM users u
                 LEFT JOIN departments d ON u.department_id = d.id
                 WHERE u.id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(office.flatten())
    }

    // Record operations

    fn create_record(&self, record: &NewRecord) -> Result<Record> {
        let now = format_datetime(&Utc::now());
        let mut values = record_field_values(&record.fields);
        values.push(Value::from(record.department_id));
        values.push(Value::from(record.created_by_user_id));
        values.push(Value::from(now.clone()));
        values.push(Value::from(now));

        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO records (
                    record_series_title_description, period_covered, volume, record_medium,
                    restrictions, location, frequency_of_use, duplication, time_value,
                    utility_value, retention_period_active, retention_period_storage,
                    retention_period_total, disposition_provision, date_of_record,
                    calculated_disposal_date, department_id, created_by_user_id,
                    created_at, updated_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params_from_iter(values),
            )
            .map_err(|e| {
                write_error(
                    e,
                    "Record already exists",
                    Error::InvalidInput,
                    "Department does not exist",
                )
            })?;
            conn.last_insert_rowid()
        };

        self.get_record(id, &Filter::unrestricted())?
            .ok_or(Error::NotFound)
    }

    fn get_record(&self, id: i64, filter: &Filter) -> Result<Option<Record>> {
        let (scope_sql, mut values) = render(filter, RECORD_SCOPE);
        let sql = format!("{} AND r.id = ?{scope_sql}", record_select("records"));
        values.insert(0, Value::from(id));

        Ok(self.query_records(&sql, values)?.into_iter().next())
    }

    fn list_records(&self, filter: &Filter) -> Result<Vec<Record>> {
        let (scope_sql, values) = render(filter, RECORD_SCOPE);
        let sql = format!(
            "{}{scope_sql} ORDER BY r.created_at DESC, r.id DESC",
            record_select("records")
        );
        self.query_records(&sql, values)
    }

    fn update_record(&self, id: i64, fields: &RecordFields, filter: &Filter) -> Result<bool> {
        let (scope_sql, scope_values) = render(filter, ScopeColumns::department("department_id"));
        let mut values = record_field_values(fields);
        values.push(Value::from(format_datetime(&Utc::now())));
        values.push(Value::from(id));
        values.extend(scope_values);

        let sql = format!(
            "UPDATE records SET
                record_series_title_description = ?, period_covered = ?, volume = ?,
                record_medium = ?, restrictions = ?, location = ?, frequency_of_use = ?,
                duplication = ?, time_value = ?, utility_value = ?, retention_period_active = ?,
                retention_period_storage = ?, retention_period_total = ?,
                disposition_provision = ?, date_of_record = ?, calculated_disposal_date = ?,
                updated_at = ?
             WHERE id = ?{scope_sql}"
        );

        let rows = self.conn().execute(&sql, params_from_iter(values))?;
        Ok(rows > 0)
    }

    fn delete_record(&self, id: i64, filter: &Filter) -> Result<bool> {
        let (scope_sql, scope_values) = render(filter, ScopeColumns::department("department_id"));
        let mut values = vec![Value::from(id)];
        values.extend(scope_values);

        let rows = self.conn().execute(
            &format!("DELETE FROM records WHERE id = ?{scope_sql}"),
            params_from_iter(values),
        )?;
        Ok(rows > 0)
    }

    fn list_disposal_due(&self, today: NaiveDate, filter: &Filter) -> Result<Vec<Record>> {
        let (scope_sql, scope_values) = render(filter, RECORD_SCOPE);
        let mut values = vec![Value::from(format_date(today))];
        values.extend(scope_values);

        let sql = format!(
            "{} AND r.calculated_disposal_date IS NOT NULL
               AND r.calculated_disposal_date <= ?{scope_sql}
             ORDER BY r.calculated_disposal_date ASC, r.id ASC",
            record_select("records")
        );
        self.query_records(&sql, values)
    }

    fn list_public_documents(&self, filter: &Filter) -> Result<Vec<Record>> {
        let (scope_sql, values) = render(filter, RECORD_SCOPE);
        let sql = format!(
            "{}{scope_sql} ORDER BY r.created_at DESC, r.id DESC",
            record_select("publicly_available_documents")
        );
        self.query_records(&sql, values)
    }

    // Record file operations

    fn create_record_file(&self, file: &NewRecordFile) -> Result<RecordFile> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO record_files
                    (record_id, file_name, stored_path, file_size, upload_date, uploaded_by_user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    file.record_id,
                    file.file_name,
                    file.stored_path,
                    file.file_size,
                    format_datetime(&Utc::now()),
                    file.uploaded_by_user_id,
                ],
            )
            .map_err(|e| {
                write_error(
                    e,
                    "Stored file name collision",
                    Error::InvalidInput,
                    "Record does not exist",
                )
            })?;
            conn.last_insert_rowid()
        };

        self.get_record_file(id, &Filter::unrestricted())?
            .ok_or(Error::NotFound)
    }

    fn get_record_file(&self, id: i64, filter: &Filter) -> Result<Option<RecordFile>> {
        let (scope_sql, scope_values) = render(filter, RECORD_SCOPE);
        let mut values = vec![Value::from(id)];
        values.extend(scope_values);

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{FILE_SELECT} AND rf.id = ?{scope_sql}"))?;
        stmt.query_row(params_from_iter(values), file_from_row)
            .optional()
            .map_err(Error::from)
    }

    fn list_record_files(&self, record_id: i64, filter: &Filter) -> Result<Vec<RecordFile>> {
        let (scope_sql, scope_values) = render(filter, RECORD_SCOPE);
        let mut values = vec![Value::from(record_id)];
        values.extend(scope_values);

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{FILE_SELECT} AND rf.record_id = ?{scope_sql} ORDER BY rf.upload_date DESC, rf.id DESC"
        ))?;
        let rows = stmt.query_map(params_from_iter(values), file_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_record_file(&self, id: i64, filter: &Filter) -> Result<bool> {
        let (scope_sql, scope_values) = render(filter, RECORD_SCOPE);
        let mut values = vec![Value::from(id)];
        values.extend(scope_values);

        let rows = self.conn().execute(
            &format!(
                "DELETE FROM record_files WHERE id = ?
                   AND record_id IN (SELECT r.id FROM records r WHERE 1=1{scope_sql})"
            ),
            params_from_iter(values),
        )?;
        Ok(rows > 0)
    }

    // Document request operations

    fn create_request(&self, request: &NewDocumentRequest) -> Result<DocumentRequest> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO document_requests
                    (record_id, requester_user_id, purpose, id_document_path, status, request_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    request.record_id,
                    request.requester_user_id,
                    request.purpose,
                    request.id_document_path,
                    RequestStatus::Pending.as_str(),
                    format_datetime(&Utc::now()),
                ],
            )
            .map_err(|e| {
                write_error(
                    e,
                    "Request already exists",
                    Error::InvalidInput,
                    "Record does not exist",
                )
            })?;
            conn.last_insert_rowid()
        };

        self.get_request(id, &Filter::unrestricted())?
            .ok_or(Error::NotFound)
    }

    fn get_request(&self, id: i64, filter: &Filter) -> Result<Option<DocumentRequest>> {
        let (scope_sql, scope_values) = render(filter, REQUEST_SCOPE);
        let mut values = vec![Value::from(id)];
        values.extend(scope_values);

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{REQUEST_SELECT} AND dr.id = ?{scope_sql}"))?;
        stmt.query_row(params_from_iter(values), request_from_row)
            .optional()
            .map_err(Error::from)
    }

    fn list_requests(&self, filter: &Filter) -> Result<Vec<DocumentRequest>> {
        let (scope_sql, values) = render(filter, REQUEST_SCOPE);

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{REQUEST_SELECT}{scope_sql} ORDER BY dr.request_date DESC, dr.id DESC"
        ))?;
        let rows = stmt.query_map(params_from_iter(values), request_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn decide_request(
        &self,
        id: i64,
        status: RequestStatus,
        approver_user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE document_requests
             SET status = ?1, approver_user_id = ?2, approval_date = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                status.as_str(),
                approver_user_id,
                format_datetime(&at),
                id,
                RequestStatus::Pending.as_str(),
            ],
        )?;
        Ok(rows > 0)
    }

    // Activity log operations

    fn append_activity(&self, entry: &NewActivity) -> Result<()> {
        self.conn().execute(
            "INSERT INTO activity_logs
                (user_id, office, operation, record_series_title_description, details,
                 action_date_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.user_id,
                entry.office,
                entry.operation,
                entry.record_series_title_description,
                entry.details,
                format_datetime(&Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn list_activity(&self, filter: &Filter, limit: i64) -> Result<Vec<ActivityLogEntry>> {
        let (scope_sql, mut values) = render(filter, ACTIVITY_SCOPE);
        values.push(Value::from(limit));

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{ACTIVITY_SELECT}{scope_sql} ORDER BY al.action_date_time DESC, al.id DESC LIMIT ?"
        ))?;
        let rows = stmt.query_map(params_from_iter(values), activity_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
