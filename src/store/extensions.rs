use super::Store;
use crate::error::{ClaspError, Result};
use crate::models::CustomExtension;
use rusqlite::params;

impl Store {
    pub fn list_custom_extensions(&self) -> Result<Vec<CustomExtension>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, extension, category FROM custom_extensions")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CustomExtension {
                    id: row.get(0)?,
                    extension: row.get(1)?,
                    category: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }

    /// Insert a custom extension mapping. Rejected if it collides with a built-in extension
    /// (§9 open question: reject-on-collision at write; built-ins win at read regardless).
    pub fn insert_custom_extension(&self, extension: &str, category: &str) -> Result<i64> {
        let ext_lower = extension.trim_start_matches('.').to_lowercase();
        if crate::classify::tier1::BUILTIN_EXTENSION_MAP.contains_key(ext_lower.as_str()) {
            return Err(ClaspError::ExtensionConflict(format!(
                "{ext_lower} is already a built-in extension"
            )));
        }
        let conn = self.lock();
        conn.execute(
            "INSERT INTO custom_extensions (extension, category) VALUES (?1, ?2)",
            params![ext_lower, category],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref se, _)
                if se.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ClaspError::ExtensionConflict(format!("{ext_lower} is already mapped"))
            }
            other => ClaspError::Db(other),
        })?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete_custom_extension(&self, extension: &str) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute(
            "DELETE FROM custom_extensions WHERE extension = ?1",
            params![extension],
        )?;
        if changed == 0 {
            return Err(ClaspError::ExtensionNotFound(extension.to_string()));
        }
        Ok(())
    }
}
