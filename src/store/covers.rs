use super::Store;
use crate::error::Result;
use crate::models::CoverPage;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

fn row_to_cover(row: &rusqlite::Row) -> rusqlite::Result<CoverPage> {
    Ok(CoverPage {
        id: row.get(0)?,
        file_id: row.get(1)?,
        cover_text: row.get(2)?,
        embedding: row.get(3)?,
        detected_at: row
            .get::<_, String>(4)?
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    })
}

const SELECT_COLS: &str = "id, file_id, cover_text, embedding, detected_at";

impl Store {
    pub fn upsert_cover_page(&self, file_id: i64, cover_text: &str, embedding: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO cover_pages (file_id, cover_text, embedding, detected_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(file_id) DO UPDATE SET
                cover_text = excluded.cover_text,
                embedding = excluded.embedding,
                detected_at = excluded.detected_at",
            params![file_id, cover_text, embedding, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_cover_page(&self, file_id: i64) -> Result<Option<CoverPage>> {
        let conn = self.lock();
        let sql = format!("SELECT {SELECT_COLS} FROM cover_pages WHERE file_id = ?1");
        Ok(conn
            .query_row(&sql, params![file_id], row_to_cover)
            .optional()?)
    }

    /// Every cover page with a non-null embedding, for the similarity grouper.
    pub fn all_covers_with_embeddings(&self) -> Result<Vec<CoverPage>> {
        let conn = self.lock();
        let sql = format!(
            "SELECT {SELECT_COLS} FROM cover_pages WHERE embedding IS NOT NULL AND embedding != ''"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_cover)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }
}
