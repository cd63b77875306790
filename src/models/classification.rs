use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Evidence tier that produced a classification result.
///
/// `Manual` (0) is not a real tier — it marks a user override, which always carries
/// `confidence_score = 1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Tier {
    Manual = 0,
    Rule = 1,
    Embedding = 2,
    Llm = 3,
}

impl Tier {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Tier::Manual),
            1 => Some(Tier::Rule),
            2 => Some(Tier::Embedding),
            3 => Some(Tier::Llm),
            _ => None,
        }
    }
}

/// One classification row. At most one non-manual row exists per (file, scan_id); manual rows
/// persist across scans and are keyed only by file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub id: i64,
    pub file_id: i64,
    pub scan_id: String,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub tier_used: Tier,
    pub confidence_score: f32,
    pub is_manual: bool,
    pub classified_at: DateTime<Utc>,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        let score_in_range = (0.0..=1.0).contains(&self.confidence_score);
        let manual_consistent =
            !self.is_manual || (self.confidence_score == 1.0 && self.tier_used == Tier::Manual);
        score_in_range && manual_consistent
    }
}
