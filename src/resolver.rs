//! Destination path resolver (C8): rule-tree traversal, deepest-match-wins, sanitization.
//!
//! Cycle rejection on `parent_id` mutation lives in `store::rules::assert_no_cycle`
//! (visited-set traversal, same idiom this module's own ancestor-chain walk uses). Path
//! sanitization follows the filesystem command module's structured-validation style.

use crate::models::{Classification, FileRecord, Rule, RuleType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const FALLBACK_FOLDER: &str = "기타";

static SANITIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00]|\.\."#).unwrap());

fn sanitize_component(raw: &str) -> String {
    let replaced = SANITIZE_RE.replace_all(raw, "_");
    let trimmed = replaced.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        FALLBACK_FOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitize_filename(raw: &str, file_id: i64, extension: Option<&str>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        let ext = extension.map(|e| format!(".{e}")).unwrap_or_default();
        return format!("unnamed_{file_id}{ext}");
    }
    trimmed.to_string()
}

fn rule_matches(rule: &Rule, file: &FileRecord, classification: &Classification) -> bool {
    let value = rule.value.to_lowercase();
    match rule.rule_type {
        RuleType::Date => file
            .modified_at
            .map(|d| d.format("%Y").to_string() == rule.value)
            .unwrap_or(false),
        RuleType::Extension => file
            .extension
            .as_deref()
            .map(|e| e.trim_start_matches('.').to_lowercase() == value)
            .unwrap_or(false),
        RuleType::Content => {
            let haystacks = [
                file.extracted_text_summary.as_deref(),
                Some(file.filename.as_str()),
                classification.category.as_deref(),
            ];
            haystacks
                .into_iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&value))
        }
    }
}

/// True if `candidate` is reachable from `start` by following `parent_id`, without revisiting a
/// node (guards against a corrupt cyclic tree slipping past `assert_no_cycle`).
fn is_descendant(by_id: &HashMap<i64, &Rule>, start: i64, candidate: i64) -> bool {
    let mut current = by_id.get(&start).and_then(|r| r.parent_id);
    let mut visited = std::collections::HashSet::new();
    while let Some(node) = current {
        if node == candidate {
            return true;
        }
        if !visited.insert(node) {
            return false;
        }
        current = by_id.get(&node).and_then(|r| r.parent_id);
    }
    false
}

fn folder_chain(by_id: &HashMap<i64, &Rule>, leaf_id: i64) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = Some(leaf_id);
    let mut visited = std::collections::HashSet::new();
    while let Some(node) = current {
        if !visited.insert(node) {
            break;
        }
        let Some(rule) = by_id.get(&node) else {
            break;
        };
        chain.push(sanitize_component(&rule.folder_name));
        current = rule.parent_id;
    }
    chain.reverse();
    chain
}

/// Resolve the final destination path for `file` given its chosen `classification`, `base_dir`,
/// and the full rule set. Always returns a path under `base_dir`.
pub fn resolve_destination(
    file: &FileRecord,
    classification: &Classification,
    base_dir: &Path,
    rules: &[Rule],
) -> PathBuf {
    let by_id: HashMap<i64, &Rule> = rules.iter().map(|r| (r.id, r)).collect();

    let mut best: Option<&Rule> = None;
    for rule in rules {
        if !rule_matches(rule, file, classification) {
            continue;
        }
        best = match best {
            None => Some(rule),
            Some(current) if is_descendant(&by_id, rule.id, current.id) => Some(rule),
            Some(current) => Some(current),
        };
    }

    let chain = match best {
        Some(rule) => folder_chain(&by_id, rule.id),
        None => match &classification.category {
            Some(cat) => vec![sanitize_component(cat)],
            None => vec![FALLBACK_FOLDER.to_string()],
        },
    };

    let filename = sanitize_filename(&file.filename, file.id, file.extension.as_deref());

    let mut dest = base_dir.to_path_buf();
    for component in &chain {
        dest.push(component);
    }
    dest.push(&filename);

    let normalized_base = normalize(base_dir);
    let normalized_dest = normalize(&dest);
    if !normalized_dest.starts_with(&normalized_base) {
        return base_dir.join(FALLBACK_FOLDER).join(&filename);
    }
    dest
}

/// Best-effort lexical normalization (no symlink resolution) — good enough for the containment
/// check since `sanitize_component` already strips `..` segments before this point.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn file(id: i64, filename: &str, extension: &str) -> FileRecord {
        FileRecord {
            id,
            path: format!("/src/{filename}"),
            filename: filename.to_string(),
            extension: Some(extension.to_string()),
            size: Some(10),
            created_at: None,
            modified_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            extracted_text_summary: Some("budget report".to_string()),
        }
    }

    fn classification(category: Option<&str>) -> Classification {
        Classification {
            id: 1,
            file_id: 1,
            scan_id: "scan-1".to_string(),
            category: category.map(|s| s.to_string()),
            tag: None,
            tier_used: crate::models::Tier::Rule,
            confidence_score: 0.8,
            is_manual: false,
            classified_at: Utc::now(),
        }
    }

    #[test]
    fn falls_back_to_category_when_no_rule_matches() {
        let f = file(1, "a.pdf", "pdf");
        let cls = classification(Some("문서"));
        let dest = resolve_destination(&f, &cls, Path::new("/base"), &[]);
        assert_eq!(dest, PathBuf::from("/base/문서/a.pdf"));
    }

    #[test]
    fn falls_back_to_unclassified_without_category() {
        let f = file(1, "a.pdf", "pdf");
        let cls = classification(None);
        let dest = resolve_destination(&f, &cls, Path::new("/base"), &[]);
        assert_eq!(dest, PathBuf::from("/base/기타/a.pdf"));
    }

    #[test]
    fn deepest_match_wins() {
        let f = file(1, "a.pdf", "pdf");
        let cls = classification(Some("문서"));
        let root = Rule {
            id: 1,
            priority: 1,
            rule_type: RuleType::Extension,
            value: "pdf".to_string(),
            folder_name: "PDFs".to_string(),
            parent_id: None,
        };
        let child = Rule {
            id: 2,
            priority: 2,
            rule_type: RuleType::Content,
            value: "budget".to_string(),
            folder_name: "Budgets".to_string(),
            parent_id: Some(1),
        };
        let dest = resolve_destination(&f, &cls, Path::new("/base"), &[root, child]);
        assert_eq!(dest, PathBuf::from("/base/PDFs/Budgets/a.pdf"));
    }

    #[test]
    fn sanitizes_path_traversal_in_folder_name() {
        let f = file(1, "a.pdf", "pdf");
        let cls = classification(Some("문서"));
        let rule = Rule {
            id: 1,
            priority: 1,
            rule_type: RuleType::Extension,
            value: "pdf".to_string(),
            folder_name: "../../etc".to_string(),
            parent_id: None,
        };
        let dest = resolve_destination(&f, &cls, Path::new("/base"), &[rule]);
        assert!(dest.starts_with("/base"));
    }

    #[test]
    fn empty_filename_becomes_unnamed() {
        let mut f = file(1, "   ", "pdf");
        f.filename = "   ".to_string();
        let cls = classification(Some("문서"));
        let dest = resolve_destination(&f, &cls, Path::new("/base"), &[]);
        assert_eq!(dest.file_name().unwrap().to_str().unwrap(), "unnamed_1.pdf");
    }
}
