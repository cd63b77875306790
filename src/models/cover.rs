use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-to-one with a file: the detected cover-page text and its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverPage {
    pub id: i64,
    pub file_id: i64,
    pub cover_text: String,
    /// JSON-serialized float32 vector.
    pub embedding: String,
    pub detected_at: DateTime<Utc>,
}

/// Membership row for a connected component of mutually-similar covers. The whole table is
/// rebuilt on every similarity pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverSimilarityGroup {
    pub id: i64,
    pub group_id: String,
    pub file_id: i64,
    pub similarity_score: f32,
    pub auto_tag: Option<String>,
}
