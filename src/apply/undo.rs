//! Undo engine: reverses a batch's `move` logs. Generalizes the teacher's undo-preflight
//! conflict-classification shape to the spec's existence-check-only model (no checksum
//! comparison — the original tracks none for this path either).

use crate::error::{ClaspError, Result};
use crate::store::Store;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct UndoOutcome {
    pub restored: i64,
    pub unrestorable: Vec<UnrestorableEntry>,
}

#[derive(Debug, Clone)]
pub struct UnrestorableEntry {
    pub source_path: String,
    pub destination_path: Option<String>,
    pub reason: &'static str,
}

pub fn undo(store: &Store, action_log_id: &str) -> Result<UndoOutcome> {
    let batch = super::require_batch(store, action_log_id)?;
    if batch.is_undone {
        return Err(ClaspError::AlreadyUndone(action_log_id.to_string()));
    }

    let logs = store.move_logs_for_batch(action_log_id)?;
    if logs.is_empty() {
        return Err(ClaspError::LogNotFound(action_log_id.to_string()));
    }

    let mut restored = 0i64;
    let mut unrestorable = Vec::new();

    for log in logs {
        if log.is_undone {
            continue;
        }
        let Some(destination) = log.destination_path.as_deref() else {
            unrestorable.push(UnrestorableEntry {
                source_path: log.source_path.clone(),
                destination_path: None,
                reason: "destination_file_not_found",
            });
            continue;
        };
        let dest_path = Path::new(destination);
        if !dest_path.exists() {
            unrestorable.push(UnrestorableEntry {
                source_path: log.source_path.clone(),
                destination_path: Some(destination.to_string()),
                reason: "destination_file_not_found",
            });
            continue;
        }

        let source_path = Path::new(&log.source_path);
        if let Some(parent) = source_path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                unrestorable.push(UnrestorableEntry {
                    source_path: log.source_path.clone(),
                    destination_path: Some(destination.to_string()),
                    reason: "move_failed",
                });
                continue;
            }
        }

        match std::fs::rename(dest_path, source_path) {
            Ok(()) => {
                if let Some(file) = store.find_file_by_path(destination)? {
                    store.update_file_path(file.id, &log.source_path)?;
                }
                store.mark_log_undone(log.id)?;
                restored += 1;
            }
            Err(_) => {
                unrestorable.push(UnrestorableEntry {
                    source_path: log.source_path.clone(),
                    destination_path: Some(destination.to_string()),
                    reason: "move_failed",
                });
            }
        }
    }

    store.mark_batch_undone(action_log_id)?;

    Ok(UndoOutcome {
        restored,
        unrestorable,
    })
}
