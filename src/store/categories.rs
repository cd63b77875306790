use super::Store;
use crate::error::{ClaspError, Result};
use crate::models::CustomCategory;
use rusqlite::params;

impl Store {
    pub fn list_custom_categories(&self) -> Result<Vec<CustomCategory>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, keywords FROM custom_categories")?;
        let rows = stmt
            .query_map([], |row| {
                let keywords_json: String = row.get(2)?;
                let keywords: Vec<String> = serde_json::from_str(&keywords_json).unwrap_or_default();
                Ok(CustomCategory {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    keywords,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }

    pub fn insert_custom_category(&self, name: &str, keywords: &[String]) -> Result<i64> {
        let conn = self.lock();
        let keywords_json = serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string());
        conn.execute(
            "INSERT INTO custom_categories (name, keywords) VALUES (?1, ?2)",
            params![name, keywords_json],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref se, _)
                if se.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ClaspError::CategoryConflict(format!("{name} already exists"))
            }
            other => ClaspError::Db(other),
        })?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete_custom_category(&self, name: &str) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute("DELETE FROM custom_categories WHERE name = ?1", params![name])?;
        if changed == 0 {
            return Err(ClaspError::CategoryNotFound(name.to_string()));
        }
        Ok(())
    }
}
