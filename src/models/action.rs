use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    Overwrite,
    Rename,
    Skip,
}

impl ConflictResolution {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "overwrite" => Some(ConflictResolution::Overwrite),
            "rename" => Some(ConflictResolution::Rename),
            "skip" => Some(ConflictResolution::Skip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictResolution::Overwrite => "overwrite",
            ConflictResolution::Rename => "rename",
            ConflictResolution::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Move,
    Skip,
    Failed,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Move => "move",
            ActionType::Skip => "skip",
            ActionType::Failed => "failed",
        }
    }
}

/// One apply invocation. The unit of undo and of `/apply/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionBatch {
    pub action_log_id: String,
    pub folder_path: String,
    pub scan_id: String,
    pub conflict_resolution: ConflictResolution,
    pub moved: i64,
    pub skipped: i64,
    pub failed: i64,
    pub executed_at: DateTime<Utc>,
    pub is_undone: bool,
}

/// A single file operation within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub id: i64,
    pub action_log_id: String,
    pub action_type: ActionType,
    pub source_path: String,
    pub destination_path: Option<String>,
    pub is_undone: bool,
}
