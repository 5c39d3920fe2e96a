pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Admins have no department; every other role belongs to exactly one
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    school_id TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id PHC string
    full_name TEXT,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    department_id INTEGER REFERENCES departments(id) ON DELETE RESTRICT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_series_title_description TEXT NOT NULL,
    period_covered TEXT,
    volume TEXT,
    record_medium TEXT,
    restrictions TEXT,
    location TEXT,
    frequency_of_use TEXT,
    duplication TEXT,
    time_value TEXT NOT NULL CHECK (time_value IN ('T', 'P')),
    utility_value TEXT,
    retention_period_active INTEGER,
    retention_period_storage INTEGER,
    retention_period_total INTEGER,
    disposition_provision TEXT,
    date_of_record TEXT,               -- YYYY-MM-DD
    calculated_disposal_date TEXT,     -- YYYY-MM-DD, NULL = never
    department_id INTEGER NOT NULL REFERENCES departments(id) ON DELETE RESTRICT,
    created_by_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Blob bookkeeping; the file itself lives under <data_dir>/uploads/<stored_path>
CREATE TABLE IF NOT EXISTS record_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
    file_name TEXT NOT NULL,
    stored_path TEXT NOT NULL UNIQUE,
    file_size INTEGER NOT NULL,
    upload_date TEXT DEFAULT (datetime('now')),
    uploaded_by_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS document_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
    requester_user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    purpose TEXT NOT NULL,
    id_document_path TEXT,
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN ('Pending', 'Approved', 'Denied')),
    request_date TEXT DEFAULT (datetime('now')),
    approval_date TEXT,
    approver_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

-- Append-only audit trail. user_id is not a foreign key so
-- entries outlive the accounts they describe.
CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    office TEXT NOT NULL,
    operation TEXT NOT NULL,
    record_series_title_description TEXT,
    details TEXT,
    action_date_time TEXT DEFAULT (datetime('now'))
);

CREATE VIEW IF NOT EXISTS publicly_available_documents AS
    SELECT * FROM records WHERE lower(trim(restrictions)) = 'open access';

CREATE INDEX IF NOT EXISTS idx_users_department ON users(department_id);
CREATE INDEX IF NOT EXISTS idx_records_department ON records(department_id);
CREATE INDEX IF NOT EXISTS idx_records_disposal ON records(calculated_disposal_date);
CREATE INDEX IF NOT EXISTS idx_record_files_record ON record_files(record_id);
CREATE INDEX IF NOT EXISTS idx_requests_requester ON document_requests(requester_user_id);
CREATE INDEX IF NOT EXISTS idx_activity_logs_user ON activity_logs(user_id);
CREATE INDEX IF NOT EXISTS idx_activity_logs_time ON activity_logs(action_date_time);
"#;
