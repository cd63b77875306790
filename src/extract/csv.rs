//! CSV extraction. Multi-encoding decode (first strict decode wins), then the same
//! header-plus-five-rows shape as the spreadsheet extractor.

use std::path::Path;

const ROW_CAP: usize = 6;
const BODY_CAP: usize = 5000;

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

fn strict_decode(bytes: &[u8], encoding: &'static encoding_rs::Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Tries utf-8, utf-8-sig (BOM-stripped utf-8), cp949, euc-kr in that order; first clean decode
/// wins.
fn decode_bytes(bytes: &[u8]) -> Option<String> {
    if let Some(text) = strict_decode(bytes, encoding_rs::UTF_8) {
        return Some(text);
    }
    if let Some(stripped) = bytes.strip_prefix(&BOM) {
        if let Some(text) = strict_decode(stripped, encoding_rs::UTF_8) {
            return Some(text);
        }
    }
    // encoding_rs's EUC_KR label implements the WHATWG windows-949 superset, which covers both
    // cp949 and euc-kr in a single decode attempt.
    if let Some(text) = strict_decode(bytes, encoding_rs::EUC_KR) {
        return Some(text);
    }
    None
}

pub fn extract_csv(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    let decoded = decode_bytes(&bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let rows: Vec<String> = reader
        .records()
        .take(ROW_CAP)
        .filter_map(|r| r.ok())
        .map(|record| record.iter().collect::<Vec<_>>().join(","))
        .collect();

    if rows.is_empty() {
        return None;
    }
    let joined = rows.join("\n");
    Some(joined.chars().take(BODY_CAP).collect())
}
