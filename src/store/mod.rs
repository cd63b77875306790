//! Persistent store: a single embedded SQLite database under WAL, holding every entity in
//! SPEC_FULL §3 plus the best-classification view as a derived query.
//!
//! Grounded on `billing::usage::UsageTracker`: one `Mutex<Connection>`, schema created via a
//! single `execute_batch`, upserts via `ON CONFLICT ... DO UPDATE`.

mod actions;
mod categories;
mod classifications;
mod covers;
mod extensions;
mod files;
mod groups;
mod rules;

pub use classifications::BestClassification;
pub use files::FileMetadataInput;

use crate::error::{ClaspError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

pub struct Store {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE,
    filename TEXT NOT NULL,
    extension TEXT,
    created_at TEXT,
    modified_at TEXT,
    size INTEGER,
    extracted_text_summary TEXT
);

CREATE TABLE IF NOT EXISTS classifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    scan_id TEXT NOT NULL,
    category TEXT,
    tag TEXT,
    tier_used INTEGER NOT NULL,
    confidence_score REAL NOT NULL,
    is_manual INTEGER NOT NULL DEFAULT 0,
    classified_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_classifications_file ON classifications(file_id, scan_id);

CREATE TABLE IF NOT EXISTS cover_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL UNIQUE REFERENCES files(id),
    cover_text TEXT,
    embedding TEXT,
    detected_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cover_similarity_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id TEXT NOT NULL,
    file_id INTEGER NOT NULL REFERENCES files(id),
    similarity_score REAL NOT NULL,
    auto_tag TEXT
);

CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    priority INTEGER NOT NULL,
    type TEXT NOT NULL,
    value TEXT NOT NULL,
    folder_name TEXT NOT NULL,
    parent_id INTEGER REFERENCES rules(id),
    UNIQUE(type, value)
);

CREATE TABLE IF NOT EXISTS custom_extensions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    extension TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS custom_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    keywords TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS action_batches (
    action_log_id TEXT PRIMARY KEY,
    folder_path TEXT NOT NULL,
    scan_id TEXT NOT NULL,
    conflict_resolution TEXT NOT NULL,
    moved INTEGER NOT NULL DEFAULT 0,
    skipped INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    executed_at TEXT NOT NULL,
    is_undone INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_action_batches_folder ON action_batches(folder_path, executed_at DESC);

CREATE TABLE IF NOT EXISTS action_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action_log_id TEXT NOT NULL REFERENCES action_batches(action_log_id),
    action_type TEXT NOT NULL,
    source_path TEXT NOT NULL,
    destination_path TEXT,
    is_undone INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_action_logs_batch ON action_logs(action_log_id);
"#;

impl Store {
    /// Open (creating if absent) the database at `path`, enable WAL, and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory store, for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// `rusqlite::Connection` is not `Sync`; `Store` exposes only locked access so sharing is safe.
unsafe impl Sync for Store {}

pub(crate) fn no_rows_to_option<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(ClaspError::Db(e)),
    }
}
