//! XLSX/XLS extraction via `calamine`, first sheet only, header + next 5 rows, values only
//! (calamine resolves cached/computed cell values, never formula source text).

use calamine::{open_workbook, Reader, Xls, Xlsx};
use std::path::Path;

const ROW_CAP: usize = 6;
const BODY_CAP: usize = 5000;

fn render_rows<'a>(rows: impl Iterator<Item = &'a [calamine::Data]>) -> String {
    rows.take(ROW_CAP)
        .map(|row| {
            row.iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn extract_xlsx(path: &Path) -> Option<String> {
    let mut workbook: Xlsx<_> = open_workbook(path).ok()?;
    let sheet_name = workbook.sheet_names().first()?.to_string();
    let range = workbook.worksheet_range(&sheet_name).ok()?;
    let text = render_rows(range.rows());
    if text.is_empty() {
        None
    } else {
        Some(text.chars().take(BODY_CAP).collect())
    }
}

pub fn extract_xls(path: &Path) -> Option<String> {
    let mut workbook: Xls<_> = open_workbook(path).ok()?;
    let sheet_name = workbook.sheet_names().first()?.to_string();
    let range = workbook.worksheet_range(&sheet_name).ok()?;
    let text = render_rows(range.rows());
    if text.is_empty() {
        None
    } else {
        Some(text.chars().take(BODY_CAP).collect())
    }
}
