//! Apply / undo engine (C9): preview and apply an organize pass against the best-classification
//! view, with a reversible audit trail.
//!
//! The counted-outcome shape (moved/skipped/failed) mirrors the teacher's `ExecutionResult`;
//! conflict-policy naming follows the distilled spec's `{overwrite, rename, skip}` rather than the
//! teacher's `{Fail, Skip, AutoRename}`.

pub mod undo;

use crate::classify::UNCLASSIFIED_THRESHOLD;
use crate::error::{ClaspError, Result};
use crate::models::{ActionType, ConflictResolution};
use crate::resolver;
use crate::store::{BestClassification, Store};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const MAX_RENAME_ATTEMPTS: usize = 1000;

/// Commonpath of the parents of every file in `best`, falling back to the first file's parent
/// if the set has no common ancestor (e.g. a single file, or paths on different roots).
fn compute_base_dir(best: &[BestClassification]) -> Result<PathBuf> {
    let first_entry = best.first().ok_or_else(|| ClaspError::ScanNotFound("no files in scan".to_string()))?;
    let first_parent = Path::new(&first_entry.file.path).parent().unwrap_or_else(|| Path::new("/"));

    let mut common: Vec<_> = first_parent.components().collect();
    for entry in &best[1..] {
        let parent = Path::new(&entry.file.path).parent().unwrap_or_else(|| Path::new("/"));
        let other: Vec<_> = parent.components().collect();
        let shared = common.iter().zip(other.iter()).take_while(|(a, b)| a == b).count();
        common.truncate(shared);
    }

    if common.is_empty() {
        Ok(first_parent.to_path_buf())
    } else {
        Ok(common.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewResult {
    pub total_files: usize,
    pub excluded_files: usize,
    pub dest_dirs: HashSet<PathBuf>,
    pub conflicts: Vec<PathBuf>,
    /// First-level tree: top folder name under `base_dir` -> file count.
    pub top_level_tree: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplyResult {
    pub action_log_id: String,
    pub moved: i64,
    pub skipped: i64,
    pub failed: i64,
}

pub fn preview(store: &Store, scan_id: &str) -> Result<PreviewResult> {
    let rules = store.list_rules()?;
    let best = store.best_classifications_for_scan(scan_id)?;
    let base_dir = compute_base_dir(&best)?;

    let mut result = PreviewResult {
        total_files: best.len(),
        ..Default::default()
    };

    for entry in &best {
        if entry.classification.confidence_score < UNCLASSIFIED_THRESHOLD {
            result.excluded_files += 1;
            continue;
        }
        let dest = resolver::resolve_destination(&entry.file, &entry.classification, &base_dir, &rules);
        let source = PathBuf::from(&entry.file.path);

        if dest.exists() && dest != source {
            result.conflicts.push(dest.clone());
        }
        if let Some(parent) = dest.parent() {
            result.dest_dirs.insert(parent.to_path_buf());
        }
        if let Ok(top) = dest.strip_prefix(&base_dir) {
            if let Some(first) = top.components().next() {
                let key = first.as_os_str().to_string_lossy().into_owned();
                *result.top_level_tree.entry(key).or_insert(0) += 1;
            }
        }
    }

    Ok(result)
}

fn resolve_conflict(dest: &Path, policy: ConflictResolution) -> Option<PathBuf> {
    if !dest.exists() {
        return Some(dest.to_path_buf());
    }
    match policy {
        ConflictResolution::Overwrite => Some(dest.to_path_buf()),
        ConflictResolution::Skip => None,
        ConflictResolution::Rename => {
            let stem = dest.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            let ext = dest.extension().map(|e| e.to_string_lossy().into_owned());
            let parent = dest.parent().unwrap_or_else(|| Path::new(""));
            for n in 1..=MAX_RENAME_ATTEMPTS {
                let candidate_name = match &ext {
                    Some(e) => format!("{stem}_{n}.{e}"),
                    None => format!("{stem}_{n}"),
                };
                let candidate = parent.join(candidate_name);
                if !candidate.exists() {
                    return Some(candidate);
                }
            }
            None
        }
    }
}

pub fn apply(
    store: &Store,
    scan_id: &str,
    conflict_resolution: ConflictResolution,
    folder_path: &str,
) -> Result<ApplyResult> {
    let action_log_id = uuid::Uuid::new_v4().to_string();
    store.create_action_batch(&action_log_id, folder_path, scan_id, conflict_resolution)?;

    let rules = store.list_rules()?;
    let best = store.best_classifications_for_scan(scan_id)?;
    let base_dir = compute_base_dir(&best)?;

    let (mut moved, mut skipped, mut failed) = (0i64, 0i64, 0i64);

    for entry in best {
        if entry.classification.confidence_score < UNCLASSIFIED_THRESHOLD {
            continue;
        }
        let source = PathBuf::from(&entry.file.path);
        let dest = resolver::resolve_destination(&entry.file, &entry.classification, &base_dir, &rules);

        if normalize_eq(&dest, &source) {
            skipped += 1;
            continue;
        }

        let Some(final_dest) = resolve_conflict(&dest, conflict_resolution) else {
            store.insert_action_log(&action_log_id, ActionType::Skip, &entry.file.path, None)?;
            skipped += 1;
            continue;
        };

        if let Some(parent) = final_dest.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                store.insert_action_log(&action_log_id, ActionType::Failed, &entry.file.path, None)?;
                failed += 1;
                continue;
            }
        }

        match std::fs::rename(&source, &final_dest) {
            Ok(()) => {
                let dest_str = final_dest.to_string_lossy().into_owned();
                store.update_file_path(entry.file.id, &dest_str)?;
                store.insert_action_log(
                    &action_log_id,
                    ActionType::Move,
                    &entry.file.path,
                    Some(&dest_str),
                )?;
                moved += 1;
            }
            Err(_) => {
                store.insert_action_log(&action_log_id, ActionType::Failed, &entry.file.path, None)?;
                failed += 1;
            }
        }
    }

    store.set_batch_counts(&action_log_id, moved, skipped, failed)?;

    Ok(ApplyResult {
        action_log_id,
        moved,
        skipped,
        failed,
    })
}

fn normalize_eq(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

pub fn history(store: &Store, folder_path: &str) -> Result<Vec<crate::models::ActionBatch>> {
    store.action_history(folder_path)
}

pub(crate) fn require_batch(store: &Store, action_log_id: &str) -> Result<crate::models::ActionBatch> {
    store
        .get_action_batch(action_log_id)?
        .ok_or_else(|| ClaspError::LogNotFound(action_log_id.to_string()))
}
