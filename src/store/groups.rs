use super::Store;
use crate::error::Result;
use crate::models::CoverSimilarityGroup;
use rusqlite::params;

impl Store {
    /// Replace the entire similarity-group table with a freshly computed set of members. The
    /// grouper owns this table outright: every pass is a full rebuild, not an incremental merge.
    pub fn replace_similarity_groups(&self, groups: &[CoverSimilarityGroup]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM cover_similarity_groups", [])?;
        for g in groups {
            tx.execute(
                "INSERT INTO cover_similarity_groups (group_id, file_id, similarity_score, auto_tag)
                 VALUES (?1, ?2, ?3, ?4)",
                params![g.group_id, g.file_id, g.similarity_score, g.auto_tag],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Other members of `file_id`'s similarity group, if it belongs to one.
    pub fn similar_files(&self, file_id: i64) -> Result<Vec<CoverSimilarityGroup>> {
        let conn = self.lock();
        let group_id: Option<String> = conn
            .query_row(
                "SELECT group_id FROM cover_similarity_groups WHERE file_id = ?1",
                params![file_id],
                |r| r.get(0),
            )
            .ok();
        let Some(group_id) = group_id else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare(
            "SELECT id, group_id, file_id, similarity_score, auto_tag
             FROM cover_similarity_groups WHERE group_id = ?1 AND file_id != ?2",
        )?;
        let rows = stmt
            .query_map(params![group_id, file_id], |row| {
                Ok(CoverSimilarityGroup {
                    id: row.get(0)?,
                    group_id: row.get(1)?,
                    file_id: row.get(2)?,
                    similarity_score: row.get(3)?,
                    auto_tag: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }
}
