use super::{no_rows_to_option, Store};
use crate::error::Result;
use crate::models::FileRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

/// One file's metadata, as collected by the scan orchestrator's metadata stage.
pub struct FileMetadataInput {
    pub path: String,
    pub filename: String,
    pub extension: Option<String>,
    pub size: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        filename: row.get(2)?,
        extension: row.get(3)?,
        created_at: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)),
        modified_at: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)),
        size: row.get(6)?,
        extracted_text_summary: row.get(7)?,
    })
}

const SELECT_COLS: &str =
    "id, path, filename, extension, created_at, modified_at, size, extracted_text_summary";

impl Store {
    /// Insert a file or update its metadata if the path is already known. Returns the row id.
    pub fn upsert_file(
        &self,
        path: &str,
        filename: &str,
        extension: Option<&str>,
        size: Option<i64>,
        created_at: Option<DateTime<Utc>>,
        modified_at: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO files (path, filename, extension, size, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(path) DO UPDATE SET
                filename = excluded.filename,
                extension = excluded.extension,
                size = excluded.size,
                created_at = excluded.created_at,
                modified_at = excluded.modified_at",
            params![
                path,
                filename,
                extension,
                size,
                created_at.map(|d| d.to_rfc3339()),
                modified_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        let id: i64 = conn.query_row("SELECT id FROM files WHERE path = ?1", params![path], |r| {
            r.get(0)
        })?;
        Ok(id)
    }

    pub fn set_extracted_text_summary(&self, file_id: i64, summary: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE files SET extracted_text_summary = ?1 WHERE id = ?2",
            params![summary.chars().take(500).collect::<String>(), file_id],
        )?;
        Ok(())
    }

    pub fn update_file_path(&self, file_id: i64, new_path: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE files SET path = ?1 WHERE id = ?2",
            params![new_path, file_id],
        )?;
        Ok(())
    }

    pub fn find_file_by_path(&self, path: &str) -> Result<Option<FileRecord>> {
        let conn = self.lock();
        let sql = format!("SELECT {SELECT_COLS} FROM files WHERE path = ?1");
        Ok(conn.query_row(&sql, params![path], row_to_file).optional()?)
    }

    pub fn get_file(&self, file_id: i64) -> Result<Option<FileRecord>> {
        let conn = self.lock();
        let sql = format!("SELECT {SELECT_COLS} FROM files WHERE id = ?1");
        no_rows_to_option(conn.query_row(&sql, params![file_id], row_to_file))
    }

    /// Upsert a chunk of files in one transaction. Used by the scan orchestrator's metadata
    /// stage to commit in batches of 50 rather than one transaction per file.
    pub fn upsert_files_batch(&self, entries: &[FileMetadataInput]) -> Result<Vec<i64>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(entries.len());
        for e in entries {
            tx.execute(
                "INSERT INTO files (path, filename, extension, size, created_at, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(path) DO UPDATE SET
                    filename = excluded.filename,
                    extension = excluded.extension,
                    size = excluded.size,
                    created_at = excluded.created_at,
                    modified_at = excluded.modified_at",
                params![
                    e.path,
                    e.filename,
                    e.extension,
                    e.size,
                    e.created_at.map(|d| d.to_rfc3339()),
                    e.modified_at.map(|d| d.to_rfc3339()),
                ],
            )?;
            let id: i64 = tx.query_row("SELECT id FROM files WHERE path = ?1", params![e.path], |r| {
                r.get(0)
            })?;
            ids.push(id);
        }
        tx.commit()?;
        Ok(ids)
    }
}
