//! Tier-1 rule engine (C3): manual override -> user rules -> extension map -> year tag.
//!
//! The built-in extension map and year regex are carried over verbatim from the original
//! engine's rule module.

use crate::error::Result;
use crate::models::{Rule, RuleType};
use crate::store::Store;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub static BUILTIN_EXTENSION_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("pdf", "문서"),
        ("docx", "문서"),
        ("doc", "문서"),
        ("txt", "문서"),
        ("md", "문서"),
        ("hwp", "문서"),
        ("rtf", "문서"),
        ("pptx", "프레젠테이션"),
        ("ppt", "프레젠테이션"),
        ("key", "프레젠테이션"),
        ("xlsx", "스프레드시트"),
        ("xls", "스프레드시트"),
        ("csv", "스프레드시트"),
        ("json", "데이터"),
        ("xml", "데이터"),
        ("yaml", "데이터"),
        ("sql", "데이터"),
        ("py", "코드"),
        ("js", "코드"),
        ("ts", "코드"),
        ("jsx", "코드"),
        ("tsx", "코드"),
        ("java", "코드"),
        ("cpp", "코드"),
        ("c", "코드"),
        ("h", "코드"),
        ("go", "코드"),
        ("rs", "코드"),
        ("html", "코드"),
        ("css", "코드"),
        ("jpg", "이미지"),
        ("jpeg", "이미지"),
        ("png", "이미지"),
        ("gif", "이미지"),
        ("svg", "이미지"),
        ("webp", "이미지"),
        ("bmp", "이미지"),
        ("mp4", "영상"),
        ("mov", "영상"),
        ("avi", "영상"),
        ("mkv", "영상"),
        ("webm", "영상"),
        ("mp3", "오디오"),
        ("wav", "오디오"),
        ("flac", "오디오"),
        ("aac", "오디오"),
        ("ogg", "오디오"),
        ("zip", "압축"),
        ("tar", "압축"),
        ("gz", "압축"),
        ("rar", "압축"),
        ("7z", "압축"),
    ])
});

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20\d{2}|19\d{2})").unwrap());

#[derive(Debug, Clone)]
pub struct Tier1Result {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub score: f32,
}

fn match_rule(rule: &Rule, filename: &str, extension: &str, extracted_text: Option<&str>) -> bool {
    let value = rule.value.to_lowercase();
    match rule.rule_type {
        RuleType::Extension => extension.trim_start_matches('.').to_lowercase() == value,
        RuleType::Date => YEAR_PATTERN
            .find(filename)
            .map(|m| m.as_str() == value)
            .unwrap_or(false),
        RuleType::Content => {
            if let Some(text) = extracted_text {
                if text.to_lowercase().contains(&value) {
                    return true;
                }
            }
            filename.to_lowercase().contains(&value)
        }
    }
}

/// Run the rule engine. `manual_category`, if present, always wins with score 1.0.
pub fn run(
    store: &Store,
    filename: &str,
    extension: &str,
    manual_category: Option<&str>,
    extracted_text: Option<&str>,
) -> Result<Tier1Result> {
    if let Some(manual) = manual_category {
        return Ok(Tier1Result {
            category: Some(manual.to_string()),
            tag: None,
            score: 1.0,
        });
    }

    for rule in store.list_rules()? {
        if match_rule(&rule, filename, extension, extracted_text) {
            return Ok(Tier1Result {
                category: Some(rule.folder_name.clone()),
                tag: None,
                score: 0.85,
            });
        }
    }

    let ext_lower = extension.trim_start_matches('.').to_lowercase();
    let custom: HashMap<String, String> = store
        .list_custom_extensions()?
        .into_iter()
        .map(|e| (e.extension, e.category))
        .collect();

    // Built-ins win on collision (the custom map is only consulted for extensions the built-in
    // map doesn't already cover).
    let category = BUILTIN_EXTENSION_MAP
        .get(ext_lower.as_str())
        .map(|s| s.to_string())
        .or_else(|| custom.get(&ext_lower).cloned());

    let Some(category) = category else {
        return Ok(Tier1Result {
            category: None,
            tag: None,
            score: 0.0,
        });
    };

    let tag = YEAR_PATTERN
        .find(filename)
        .map(|m| format!("{category}_{}", m.as_str()));

    Ok(Tier1Result {
        category: Some(category),
        tag,
        score: 0.70,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_fallback() {
        let store = Store::in_memory().unwrap();
        let result = run(&store, "a.pdf", "pdf", None, None).unwrap();
        assert_eq!(result.category.as_deref(), Some("문서"));
        assert_eq!(result.score, 0.70);
        assert_eq!(result.tag, None);
    }

    #[test]
    fn year_tag() {
        let store = Store::in_memory().unwrap();
        let result = run(&store, "report_2024.pdf", "pdf", None, None).unwrap();
        assert_eq!(result.tag.as_deref(), Some("문서_2024"));
    }

    #[test]
    fn rule_precedence_over_extension() {
        let store = Store::in_memory().unwrap();
        store
            .insert_rule(1, RuleType::Extension, "pdf", "PDFs", None)
            .unwrap();
        let result = run(&store, "a.pdf", "pdf", None, None).unwrap();
        assert_eq!(result.category.as_deref(), Some("PDFs"));
        assert_eq!(result.score, 0.85);
    }

    #[test]
    fn manual_category_shortcuts_everything() {
        let store = Store::in_memory().unwrap();
        let result = run(&store, "a.pdf", "pdf", Some("내카테고리"), None).unwrap();
        assert_eq!(result.category.as_deref(), Some("내카테고리"));
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn unknown_extension_returns_zero_score() {
        let store = Store::in_memory().unwrap();
        let result = run(&store, "a.xyz", "xyz", None, None).unwrap();
        assert_eq!(result.category, None);
        assert_eq!(result.score, 0.0);
    }
}
