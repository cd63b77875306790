//! DOCX extraction via `docx-rs`, walking `DocumentChild`/`ParagraphChild` the way the teacher's
//! document parser does, simplified to paragraph text only (no table flattening — the spec only
//! asks for "non-empty paragraphs").

use std::path::Path;

const BODY_CAP: usize = 5000;
const COVER_PARAGRAPH_CAP: usize = 10;

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

fn non_empty_paragraphs(path: &Path) -> Option<Vec<String>> {
    let bytes = std::fs::read(path).ok()?;
    let doc = docx_rs::read_docx(&bytes).ok()?;
    let paragraphs = doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>();
    Some(paragraphs)
}

pub fn extract_body(path: &Path) -> Option<String> {
    let paragraphs = non_empty_paragraphs(path)?;
    if paragraphs.is_empty() {
        return None;
    }
    let joined = paragraphs.join("\n");
    Some(joined.chars().take(BODY_CAP).collect())
}

pub fn extract_cover(path: &Path) -> Option<String> {
    let paragraphs = non_empty_paragraphs(path)?;
    if paragraphs.is_empty() {
        return None;
    }
    Some(paragraphs.into_iter().take(COVER_PARAGRAPH_CAP).collect::<Vec<_>>().join("\n"))
}
