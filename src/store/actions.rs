use super::Store;
use crate::error::Result;
use crate::models::{ActionBatch, ActionLog, ActionType, ConflictResolution};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

fn row_to_batch(row: &rusqlite::Row) -> rusqlite::Result<ActionBatch> {
    let resolution_raw: String = row.get(3)?;
    Ok(ActionBatch {
        action_log_id: row.get(0)?,
        folder_path: row.get(1)?,
        scan_id: row.get(2)?,
        conflict_resolution: ConflictResolution::parse(&resolution_raw)
            .unwrap_or(ConflictResolution::Skip),
        moved: row.get(4)?,
        skipped: row.get(5)?,
        failed: row.get(6)?,
        executed_at: row
            .get::<_, String>(7)?
            .parse()
            .unwrap_or_else(|_| Utc::now()),
        is_undone: row.get::<_, i64>(8)? != 0,
    })
}

const BATCH_COLS: &str = "action_log_id, folder_path, scan_id, conflict_resolution, moved, skipped, failed, executed_at, is_undone";

impl Store {
    pub fn create_action_batch(
        &self,
        action_log_id: &str,
        folder_path: &str,
        scan_id: &str,
        conflict_resolution: ConflictResolution,
    ) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO action_batches
                (action_log_id, folder_path, scan_id, conflict_resolution, moved, skipped, failed, executed_at, is_undone)
             VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5, 0)",
            params![
                action_log_id,
                folder_path,
                scan_id,
                conflict_resolution.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn set_batch_counts(
        &self,
        action_log_id: &str,
        moved: i64,
        skipped: i64,
        failed: i64,
    ) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE action_batches SET moved = ?1, skipped = ?2, failed = ?3 WHERE action_log_id = ?4",
            params![moved, skipped, failed, action_log_id],
        )?;
        Ok(())
    }

    pub fn mark_batch_undone(&self, action_log_id: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE action_batches SET is_undone = 1 WHERE action_log_id = ?1",
            params![action_log_id],
        )?;
        Ok(())
    }

    pub fn get_action_batch(&self, action_log_id: &str) -> Result<Option<ActionBatch>> {
        let conn = self.lock();
        let sql = format!("SELECT {BATCH_COLS} FROM action_batches WHERE action_log_id = ?1");
        Ok(conn
            .query_row(&sql, params![action_log_id], row_to_batch)
            .optional()?)
    }

    /// Batches for a folder, newest first.
    pub fn action_history(&self, folder_path: &str) -> Result<Vec<ActionBatch>> {
        let conn = self.lock();
        let sql =
            format!("SELECT {BATCH_COLS} FROM action_batches WHERE folder_path = ?1 ORDER BY executed_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![folder_path], row_to_batch)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }

    pub fn insert_action_log(
        &self,
        action_log_id: &str,
        action_type: ActionType,
        source_path: &str,
        destination_path: Option<&str>,
    ) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO action_logs (action_log_id, action_type, source_path, destination_path, is_undone)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![action_log_id, action_type.as_str(), source_path, destination_path],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn mark_log_undone(&self, log_id: i64) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE action_logs SET is_undone = 1 WHERE id = ?1",
            params![log_id],
        )?;
        Ok(())
    }

    /// `move` logs for a batch, in insertion order.
    pub fn move_logs_for_batch(&self, action_log_id: &str) -> Result<Vec<ActionLog>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, action_log_id, action_type, source_path, destination_path, is_undone
             FROM action_logs WHERE action_log_id = ?1 AND action_type = 'move' ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![action_log_id], |row| {
                Ok(ActionLog {
                    id: row.get(0)?,
                    action_log_id: row.get(1)?,
                    action_type: ActionType::Move,
                    source_path: row.get(3)?,
                    destination_path: row.get(4)?,
                    is_undone: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }
}
