use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scanned file. Created on first scan, updated on re-scan, never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub extension: Option<String>,
    pub size: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    /// First 500 chars of extracted body text, if any.
    pub extracted_text_summary: Option<String>,
}
