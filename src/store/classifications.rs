use super::Store;
use crate::error::Result;
use crate::models::{Classification, FileRecord, Tier};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// A file paired with its best classification for a scan (manual beats latest auto).
#[derive(Debug, Clone)]
pub struct BestClassification {
    pub file: FileRecord,
    pub classification: Classification,
}

fn row_to_classification(row: &rusqlite::Row) -> rusqlite::Result<Classification> {
    let tier_raw: i32 = row.get(5)?;
    Ok(Classification {
        id: row.get(0)?,
        file_id: row.get(1)?,
        scan_id: row.get(2)?,
        category: row.get(3)?,
        tag: row.get(4)?,
        tier_used: Tier::from_i32(tier_raw).unwrap_or(Tier::Rule),
        confidence_score: row.get(6)?,
        is_manual: row.get::<_, i64>(7)? != 0,
        classified_at: row
            .get::<_, String>(8)?
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    })
}

const SELECT_COLS: &str =
    "id, file_id, scan_id, category, tag, tier_used, confidence_score, is_manual, classified_at";

impl Store {
    /// Record a classification result. Per SPEC_FULL invariants: for a given (file, scan_id,
    /// is_manual=false) at most one row exists — prior auto rows for that pair are purged first.
    /// Manual rows are never purged by a re-scan.
    pub fn insert_classification(
        &self,
        file_id: i64,
        scan_id: &str,
        category: Option<&str>,
        tag: Option<&str>,
        tier_used: Tier,
        confidence_score: f32,
        is_manual: bool,
    ) -> Result<i64> {
        let conn = self.lock();
        if !is_manual {
            conn.execute(
                "DELETE FROM classifications WHERE file_id = ?1 AND scan_id = ?2 AND is_manual = 0",
                params![file_id, scan_id],
            )?;
        }
        conn.execute(
            "INSERT INTO classifications
                (file_id, scan_id, category, tag, tier_used, confidence_score, is_manual, classified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                file_id,
                scan_id,
                category,
                tag,
                tier_used as i32,
                confidence_score,
                is_manual as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most-recent manual classification for a file, if any. Tier-1's first rule of evidence.
    pub fn latest_manual_classification(&self, file_id: i64) -> Result<Option<Classification>> {
        let conn = self.lock();
        let sql = format!(
            "SELECT {SELECT_COLS} FROM classifications
             WHERE file_id = ?1 AND is_manual = 1
             ORDER BY classified_at DESC LIMIT 1"
        );
        Ok(conn
            .query_row(&sql, params![file_id], row_to_classification)
            .optional()?)
    }

    /// Most recent non-manual classification for a file, across any scan. Used by the similarity
    /// grouper, which cares about the auto category regardless of which scan produced it.
    pub fn latest_auto_classification(&self, file_id: i64) -> Result<Option<Classification>> {
        let conn = self.lock();
        let sql = format!(
            "SELECT {SELECT_COLS} FROM classifications
             WHERE file_id = ?1 AND is_manual = 0
             ORDER BY classified_at DESC LIMIT 1"
        );
        Ok(conn
            .query_row(&sql, params![file_id], row_to_classification)
            .optional()?)
    }

    /// Best-classification view for one file within a scan: manual row if any, else the latest
    /// auto row for `scan_id`.
    pub fn best_classification_for_file(
        &self,
        file_id: i64,
        scan_id: &str,
    ) -> Result<Option<Classification>> {
        if let Some(manual) = self.latest_manual_classification(file_id)? {
            return Ok(Some(manual));
        }
        let conn = self.lock();
        let sql = format!(
            "SELECT {SELECT_COLS} FROM classifications
             WHERE file_id = ?1 AND scan_id = ?2 AND is_manual = 0
             ORDER BY classified_at DESC LIMIT 1"
        );
        Ok(conn
            .query_row(&sql, params![file_id, scan_id], row_to_classification)
            .optional()?)
    }

    /// Best-classification view across every file classified within `scan_id`.
    pub fn best_classifications_for_scan(&self, scan_id: &str) -> Result<Vec<BestClassification>> {
        let file_ids: Vec<i64> = {
            let conn = self.lock();
            let mut stmt = conn.prepare(
                "SELECT DISTINCT file_id FROM classifications WHERE scan_id = ?1
                 UNION
                 SELECT DISTINCT file_id FROM classifications WHERE is_manual = 1",
            )?;
            stmt.query_map(params![scan_id], |r| r.get(0))?
                .collect::<rusqlite::Result<_>>()?
        };

        let mut out = Vec::with_capacity(file_ids.len());
        for file_id in file_ids {
            let Some(classification) = self.best_classification_for_file(file_id, scan_id)? else {
                continue;
            };
            let Some(file) = self.get_file(file_id)? else {
                continue;
            };
            out.push(BestClassification {
                file,
                classification,
            });
        }
        Ok(out)
    }
}
