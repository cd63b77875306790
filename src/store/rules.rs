use super::Store;
use crate::error::{ClaspError, Result};
use crate::models::{Rule, RuleType};
use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;

fn row_to_rule(row: &rusqlite::Row) -> rusqlite::Result<Rule> {
    let type_raw: String = row.get(2)?;
    Ok(Rule {
        id: row.get(0)?,
        priority: row.get(1)?,
        rule_type: RuleType::parse(&type_raw).unwrap_or(RuleType::Content),
        value: row.get(3)?,
        folder_name: row.get(4)?,
        parent_id: row.get(5)?,
    })
}

const SELECT_COLS: &str = "id, priority, type, value, folder_name, parent_id";

impl Store {
    /// All rules, priority ascending — the order every consumer (tier-1, resolver) must use.
    pub fn list_rules(&self) -> Result<Vec<Rule>> {
        let conn = self.lock();
        let sql = format!("SELECT {SELECT_COLS} FROM rules ORDER BY priority ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_rule)?.collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }

    pub fn get_rule(&self, id: i64) -> Result<Option<Rule>> {
        let conn = self.lock();
        let sql = format!("SELECT {SELECT_COLS} FROM rules WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], row_to_rule).optional()?)
    }

    pub fn insert_rule(
        &self,
        priority: i64,
        rule_type: RuleType,
        value: &str,
        folder_name: &str,
        parent_id: Option<i64>,
    ) -> Result<i64> {
        if let Some(parent) = parent_id {
            self.assert_no_cycle(parent, None)?;
        }
        let conn = self.lock();
        conn.execute(
            "INSERT INTO rules (priority, type, value, folder_name, parent_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![priority, rule_type.as_str(), value, folder_name, parent_id],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref se, _)
                if se.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ClaspError::RuleConflict(format!("{rule_type:?} rule for {value} already exists"))
            }
            other => ClaspError::Db(other),
        })?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_rule_parent(&self, rule_id: i64, new_parent_id: Option<i64>) -> Result<()> {
        if let Some(parent) = new_parent_id {
            self.assert_no_cycle(parent, Some(rule_id))?;
        }
        let conn = self.lock();
        conn.execute(
            "UPDATE rules SET parent_id = ?1 WHERE id = ?2",
            params![new_parent_id, rule_id],
        )?;
        Ok(())
    }

    pub fn delete_rule(&self, rule_id: i64) -> Result<()> {
        let conn = self.lock();
        // Re-parent children of the deleted node to its own parent, matching the HTTP contract
        // in SPEC_FULL §6 ("re-parent children of a deleted node to its parent").
        let parent_of_deleted: Option<i64> = conn
            .query_row(
                "SELECT parent_id FROM rules WHERE id = ?1",
                params![rule_id],
                |r| r.get(0),
            )
            .optional()?
            .flatten();
        conn.execute(
            "UPDATE rules SET parent_id = ?1 WHERE parent_id = ?2",
            params![parent_of_deleted, rule_id],
        )?;
        conn.execute("DELETE FROM rules WHERE id = ?1", params![rule_id])?;
        Ok(())
    }

    /// Walk ancestors of `candidate_parent` and reject if `rule_id` (the node being re-parented,
    /// or a not-yet-inserted node on insert) would become its own ancestor. Visited-set traversal,
    /// generalizing the symlink-loop check idiom: bail on revisit rather than looping forever.
    fn assert_no_cycle(&self, candidate_parent: i64, rule_id: Option<i64>) -> Result<()> {
        let conn = self.lock();
        let mut visited = HashSet::new();
        let mut current = Some(candidate_parent);
        while let Some(node) = current {
            if Some(node) == rule_id {
                return Err(ClaspError::RuleConflict(
                    "rule parent assignment would introduce a cycle".into(),
                ));
            }
            if !visited.insert(node) {
                return Err(ClaspError::RuleConflict(
                    "rule tree already contains a cycle".into(),
                ));
            }
            current = conn
                .query_row(
                    "SELECT parent_id FROM rules WHERE id = ?1",
                    params![node],
                    |r| r.get::<_, Option<i64>>(0),
                )
                .optional()?
                .flatten();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_parenting_cycle() {
        let store = Store::in_memory().unwrap();
        let a = store
            .insert_rule(1, RuleType::Extension, "pdf", "PDFs", None)
            .unwrap();
        let b = store
            .insert_rule(2, RuleType::Extension, "docx", "Docs", Some(a))
            .unwrap();
        // a -> b would close the loop a -> b -> a
        assert!(store.update_rule_parent(a, Some(b)).is_err());
    }

    #[test]
    fn rejects_duplicate_type_value() {
        let store = Store::in_memory().unwrap();
        store
            .insert_rule(1, RuleType::Extension, "pdf", "PDFs", None)
            .unwrap();
        assert!(store
            .insert_rule(2, RuleType::Extension, "pdf", "Other", None)
            .is_err());
    }

    #[test]
    fn delete_reparents_children() {
        let store = Store::in_memory().unwrap();
        let root = store
            .insert_rule(1, RuleType::Extension, "pdf", "root", None)
            .unwrap();
        let mid = store
            .insert_rule(2, RuleType::Extension, "docx", "mid", Some(root))
            .unwrap();
        let leaf = store
            .insert_rule(3, RuleType::Extension, "txt", "leaf", Some(mid))
            .unwrap();
        store.delete_rule(mid).unwrap();
        let leaf_rule = store.get_rule(leaf).unwrap().unwrap();
        assert_eq!(leaf_rule.parent_id, Some(root));
    }
}
