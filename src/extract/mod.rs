//! Text and cover-page extraction (C1): format-specific partial reads, grounded on the teacher's
//! format-by-extension dispatch with each backend generalized to the distilled spec's exact
//! sampling/caps rather than the teacher's own constants.

mod cover;
mod csv;
mod doc;
mod docx;
mod pdf;
mod plain;
mod xlsx;

pub use cover::is_cover_page;

use std::path::Path;

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Best-effort body text for classification. Any failure (missing library, corrupt file, timeout)
/// degrades to `None`, never an error.
pub fn extract_text(path: &Path) -> Option<String> {
    match extension_of(path).as_str() {
        "pdf" => pdf::extract_body(path),
        "docx" => docx::extract_body(path),
        "xlsx" => xlsx::extract_xlsx(path),
        "xls" => xlsx::extract_xls(path),
        "csv" => csv::extract_csv(path),
        "txt" | "md" => plain::extract_plain(path),
        "doc" => doc::extract_doc(path),
        _ => None,
    }
}

/// First page/front-matter text, for cover-page detection. Only PDF and DOCX carry a notion of
/// "first page".
pub fn extract_cover_text(path: &Path) -> Option<String> {
    let raw = match extension_of(path).as_str() {
        "pdf" => pdf::extract_first_page(path),
        "docx" => docx::extract_cover(path),
        _ => None,
    }?;
    is_cover_page(&raw).then_some(raw)
}
