//! Scan orchestrator (C6): the 7-stage pipeline that turns a folder into classified, grouped
//! files in the store, reported as a stream of progress events.
//!
//! The collection mechanics are grounded on `vfs::scanner::JWalkScanner` (see `walker`),
//! generalized from "build a VFS tree" to "enumerate paths feeding the classify pipeline." The
//! streaming-progress-channel design has no direct teacher precedent and is built fresh on top
//! of `tokio`'s already-declared `sync` feature.
//!
//! The walk and the per-file format extractors run off-thread via `spawn_blocking`; embedding
//! inference and store access stay on the scan task itself.

pub mod walker;

use crate::classify::Pipeline;
use crate::embed::EmbeddingProvider;
use crate::error::{ClaspError, Result};
use crate::store::{FileMetadataInput, Store};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

const METADATA_BATCH_SIZE: usize = 50;
const BODY_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt", "md"];
const SUMMARY_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect = 1,
    Metadata = 2,
    Cover = 3,
    BodyExtraction = 4,
    Classify = 5,
    SimilarityGroups = 6,
    Complete = 7,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// `-1` marks a catastrophic, stream-ending failure; otherwise one of `Stage`'s values.
    pub stage: i32,
    pub message: String,
    pub total: usize,
    pub completed: usize,
    pub current_file: Option<String>,
}

impl ProgressEvent {
    fn stage(stage: Stage, message: impl Into<String>, total: usize, completed: usize, current_file: Option<String>) -> Self {
        Self {
            stage: stage as i32,
            message: message.into(),
            total,
            completed,
            current_file,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            stage: -1,
            message: message.into(),
            total: 0,
            completed: 0,
            current_file: None,
        }
    }
}

fn file_metadata(path: &Path) -> (Option<i64>, Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let Ok(meta) = std::fs::metadata(path) else {
        return (None, None, None);
    };
    let size = Some(meta.len() as i64);
    let created_at = meta.created().ok().map(DateTime::<Utc>::from);
    let modified_at = meta.modified().ok().map(DateTime::<Utc>::from);
    (size, created_at, modified_at)
}

/// Launch a scan as a background task, returning a channel of progress events. Dropping the
/// receiver stops the orchestrator at the next yield point; store state already committed stays
/// committed (no rollback of prior stages).
pub fn run_scan(
    store: Arc<Store>,
    embedder: Arc<EmbeddingProvider>,
    llm: Arc<crate::classify::tier3::Tier3Client>,
    scan_id: String,
    folder_path: PathBuf,
) -> Result<mpsc::Receiver<ProgressEvent>> {
    if !folder_path.exists() {
        return Err(ClaspError::FolderNotFound(folder_path));
    }
    if !folder_path.is_dir() {
        return Err(ClaspError::FolderNotFound(folder_path));
    }

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        if let Err(err) = drive(&tx, &store, &embedder, &llm, &scan_id, &folder_path).await {
            let _ = tx.send(ProgressEvent::error(err.to_string())).await;
        }
    });
    Ok(rx)
}

async fn drive(
    tx: &mpsc::Sender<ProgressEvent>,
    store: &Store,
    embedder: &EmbeddingProvider,
    llm: &crate::classify::tier3::Tier3Client,
    scan_id: &str,
    folder_path: &Path,
) -> Result<()> {
    // Stage 1: Collect.
    let root = folder_path.to_path_buf();
    let files = tokio::task::spawn_blocking(move || walker::collect_files(&root))
        .await
        .map_err(|e| ClaspError::SaveFailed(e.to_string()))?;
    let total = files.len();
    if tx
        .send(ProgressEvent::stage(
            Stage::Collect,
            format!("collected {total} files"),
            total,
            total,
            None,
        ))
        .await
        .is_err()
    {
        return Ok(());
    }

    // Stage 2: Metadata, committed in batches of 50.
    let mut file_ids = Vec::with_capacity(total);
    for (chunk_idx, chunk) in files.chunks(METADATA_BATCH_SIZE).enumerate() {
        let paths: Vec<PathBuf> = chunk.to_vec();
        let entries = tokio::task::spawn_blocking(move || {
            paths
                .into_iter()
                .map(|path| {
                    let (size, created_at, modified_at) = file_metadata(&path);
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let extension = path
                        .extension()
                        .map(|e| e.to_string_lossy().to_lowercase());
                    FileMetadataInput {
                        path: path.to_string_lossy().into_owned(),
                        filename,
                        extension,
                        size,
                        created_at,
                        modified_at,
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| ClaspError::SaveFailed(e.to_string()))?;

        let ids = store.upsert_files_batch(&entries)?;
        for (i, id) in ids.iter().enumerate() {
            file_ids.push(*id);
            let completed = chunk_idx * METADATA_BATCH_SIZE + i + 1;
            if tx
                .send(ProgressEvent::stage(
                    Stage::Metadata,
                    "updated file metadata",
                    total,
                    completed,
                    Some(entries[i].path.clone()),
                ))
                .await
                .is_err()
            {
                return Ok(());
            }
        }
    }

    // Stage 3: Cover.
    for (i, path) in files.iter().enumerate() {
        let path_owned = path.clone();
        let cover_text = tokio::task::spawn_blocking(move || crate::extract::extract_cover_text(&path_owned))
            .await
            .map_err(|e| ClaspError::SaveFailed(e.to_string()))?;
        if let Some(text) = cover_text {
            if let Some(embedding_json) = embedder.compute_embedding(&text) {
                store.upsert_cover_page(file_ids[i], &text, &embedding_json)?;
            }
        }
        if tx
            .send(ProgressEvent::stage(
                Stage::Cover,
                "checked for cover page",
                total,
                i + 1,
                Some(path.to_string_lossy().into_owned()),
            ))
            .await
            .is_err()
        {
            return Ok(());
        }
    }

    // Stage 4: Body extraction, for extensions the spec names.
    let mut extracted_text: Vec<Option<String>> = vec![None; total];
    for (i, path) in files.iter().enumerate() {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if BODY_EXTENSIONS.contains(&ext.as_str()) {
            let path_owned = path.clone();
            let text = tokio::task::spawn_blocking(move || crate::extract::extract_text(&path_owned))
                .await
                .map_err(|e| ClaspError::SaveFailed(e.to_string()))?;
            if let Some(text) = text {
                let summary: String = text.chars().take(SUMMARY_CAP).collect();
                store.set_extracted_text_summary(file_ids[i], &summary)?;
                extracted_text[i] = Some(text);
            }
        }
        if tx
            .send(ProgressEvent::stage(
                Stage::BodyExtraction,
                "extracted body text",
                total,
                i + 1,
                Some(path.to_string_lossy().into_owned()),
            ))
            .await
            .is_err()
        {
            return Ok(());
        }
    }

    // Stage 5: Classify.
    let pipeline = Pipeline::new(store, embedder, llm);
    for (i, path) in files.iter().enumerate() {
        let file_id = file_ids[i];
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let manual = store.latest_manual_classification(file_id)?;
        let cover = store.get_cover_page(file_id)?;

        let outcome = pipeline
            .classify(
                &filename,
                &extension,
                manual.as_ref().and_then(|m| m.category.as_deref()),
                extracted_text[i].as_deref(),
                cover.as_ref().map(|c| c.cover_text.as_str()),
            )
            .await?;

        // Always the auto row for this scan; the manual override row, if any, was already written
        // by set_manual_classification and must not be duplicated here.
        store.insert_classification(
            file_id,
            scan_id,
            outcome.category.as_deref(),
            outcome.tag.as_deref(),
            outcome.tier,
            outcome.score,
            false,
        )?;

        if tx
            .send(ProgressEvent::stage(
                Stage::Classify,
                "classified file",
                total,
                i + 1,
                Some(path.to_string_lossy().into_owned()),
            ))
            .await
            .is_err()
        {
            return Ok(());
        }
    }

    // Stage 6: Similarity groups.
    crate::similarity::rebuild_groups(store, embedder)?;
    if tx
        .send(ProgressEvent::stage(
            Stage::SimilarityGroups,
            "rebuilt cover similarity groups",
            total,
            total,
            None,
        ))
        .await
        .is_err()
    {
        return Ok(());
    }

    // Stage 7: Complete.
    let _ = tx
        .send(ProgressEvent::stage(
            Stage::Complete,
            "scan complete",
            total,
            total,
            None,
        ))
        .await;

    Ok(())
}
