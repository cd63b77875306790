//! Plain-text extraction (txt/md): lossy UTF-8, first 5000 chars.

use std::path::Path;

const BODY_CAP: usize = 5000;

pub fn extract_plain(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    if text.trim().is_empty() {
        return None;
    }
    Some(text.chars().take(BODY_CAP).collect())
}
