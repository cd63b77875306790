//! PDF extraction, grounded on the teacher's `pdf_extract::extract_text_from_mem` +
//! `catch_unwind` pattern (malformed fonts/glyphs are a known panic source in the crate's CFF
//! parser), generalized to per-page extraction so body and cover text can use different page
//! windows.

use std::path::Path;

const PAGE_SAMPLE_CAP: usize = 300;
const SHORT_DOC_PAGE_CAP: usize = 1200;
const SAMPLE_RATIOS: [f64; 4] = [0.30, 0.45, 0.65, 0.85];

fn pages_from_mem(bytes: &[u8]) -> Option<Vec<String>> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages_from_mem(bytes)
    }))
    .ok()?
    .ok()
}

fn read_pages(path: &Path) -> Option<Vec<String>> {
    let bytes = std::fs::read(path).ok()?;
    let pages = pages_from_mem(&bytes)?;
    if pages.is_empty() {
        None
    } else {
        Some(pages)
    }
}

/// Skip pages 0-1 when there are at least 3 pages, then either concatenate a flat per-page cap
/// (short documents) or sample four pages at fixed ratios (long documents).
pub fn extract_body(path: &Path) -> Option<String> {
    let pages = read_pages(path)?;
    let total = pages.len();
    let start = if total >= 3 { 2 } else { 0 };
    let effective = &pages[start..];
    let n = effective.len();
    if n == 0 {
        return None;
    }

    if n < 4 {
        let joined = effective
            .iter()
            .map(|p| p.chars().take(SHORT_DOC_PAGE_CAP).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        return Some(joined);
    }

    let mut indices: Vec<usize> = SAMPLE_RATIOS
        .iter()
        .map(|r| ((r * n as f64).floor() as usize).min(n - 1))
        .collect();
    indices.sort_unstable();
    indices.dedup();

    let joined = indices
        .iter()
        .map(|&i| effective[i].chars().take(PAGE_SAMPLE_CAP).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    Some(joined)
}

pub fn extract_first_page(path: &Path) -> Option<String> {
    let pages = read_pages(path)?;
    pages.into_iter().next()
}
