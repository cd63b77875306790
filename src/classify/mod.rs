//! Classification pipeline (C5): runs all three tiers and picks the best result.
//!
//! The ensemble/boost algorithm is carried over verbatim from the original engine's pipeline:
//! tiers always run (no early exit once text is available), matching categories get boosted,
//! and Tier-3 only replaces the running best when it scores strictly higher.

pub mod tier1;
pub mod tier3;

use crate::embed::EmbeddingProvider;
use crate::error::Result;
use crate::store::Store;
use tier3::Tier3Client;

/// Files below this score are surfaced as "미분류" (unclassified) rather than auto-filed.
pub const UNCLASSIFIED_THRESHOLD: f32 = 0.31;

/// Extensions whose content is not worth running Tier-2/3 on unless a cover page was extracted.
const NON_TEXT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "mp4", "mov", "avi", "mkv", "webm", "mp3",
    "wav", "flac", "aac", "ogg", "zip", "tar", "gz", "rar", "7z",
];

#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub score: f32,
    pub tier: crate::models::Tier,
    pub embedding_json: Option<String>,
}

pub struct Pipeline<'a> {
    pub store: &'a Store,
    pub embedder: &'a EmbeddingProvider,
    pub llm: &'a Tier3Client,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a Store, embedder: &'a EmbeddingProvider, llm: &'a Tier3Client) -> Self {
        Self {
            store,
            embedder,
            llm,
        }
    }

    pub async fn classify(
        &self,
        filename: &str,
        extension: &str,
        manual_category: Option<&str>,
        extracted_text: Option<&str>,
        cover_text: Option<&str>,
    ) -> Result<ClassificationOutcome> {
        let t1 = tier1::run(self.store, filename, extension, manual_category, extracted_text)?;

        if manual_category.is_some() {
            return Ok(ClassificationOutcome {
                category: t1.category,
                tag: t1.tag,
                score: t1.score,
                tier: crate::models::Tier::Manual,
                embedding_json: None,
            });
        }

        let t2_input = extracted_text.filter(|s| !s.is_empty()).or(cover_text);

        let ext_lower = extension.trim_start_matches('.').to_lowercase();
        let is_non_text = NON_TEXT_EXTENSIONS.contains(&ext_lower.as_str());

        if (is_non_text && t2_input.is_none()) || t2_input.is_none() {
            return Ok(ClassificationOutcome {
                category: t1.category,
                tag: t1.tag,
                score: t1.score,
                tier: crate::models::Tier::Rule,
                embedding_json: None,
            });
        }
        let t2_input = t2_input.unwrap();

        let custom_categories = self.store.list_custom_categories()?;
        let extra_names: Vec<String> = custom_categories.iter().map(|c| c.name.clone()).collect();

        let t2 = self.embedder.classify_text(t2_input);

        let (mut category, mut tag, mut score, mut tier, mut embedding_json) =
            match (&t1.category, &t2.category) {
                (Some(t1_cat), Some(t2_cat)) if t1_cat == t2_cat => {
                    let boosted = (t1.score + t2.score) / 2.0 + 0.10;
                    let tag = self
                        .embedder
                        .infer_tag(t2_input, t1_cat)
                        .or_else(|| t1.tag.clone());
                    (
                        t1.category.clone(),
                        tag,
                        boosted.min(1.0),
                        crate::models::Tier::Embedding,
                        Some(t2.embedding_json.clone()),
                    )
                }
                (_, Some(t2_cat)) if t2.score > t1.score => {
                    let tag = self
                        .embedder
                        .infer_tag(t2_input, t2_cat)
                        .or_else(|| t1.tag.clone());
                    (
                        t2.category.clone(),
                        tag,
                        t2.score,
                        crate::models::Tier::Embedding,
                        Some(t2.embedding_json.clone()),
                    )
                }
                _ => {
                    // Keep Tier-1's category but prefer an embedding-inferred tag over the rule
                    // engine's own tag; retry with Tier-2's category if Tier-1's has no tag
                    // candidates and the two disagree.
                    let mut tag = t1
                        .category
                        .as_deref()
                        .and_then(|cat| self.embedder.infer_tag(t2_input, cat));
                    if tag.is_none() {
                        if let Some(t2_cat) = &t2.category {
                            if t1.category.as_deref() != Some(t2_cat.as_str()) {
                                tag = self.embedder.infer_tag(t2_input, t2_cat);
                            }
                        }
                    }
                    if tag.is_none() {
                        tag = t1.tag.clone();
                    }
                    (
                        t1.category.clone(),
                        tag,
                        t1.score,
                        crate::models::Tier::Rule,
                        Some(t2.embedding_json.clone()),
                    )
                }
            };

        if self.llm.is_available() {
            let t3 = self
                .llm
                .run(t2_input, filename, Some(&extra_names))
                .await;
            if let Some(t3_cat) = t3.category.filter(|_| t3.score > score) {
                let mut t3_tag = t3.tag;
                if t3_tag.is_none() {
                    t3_tag = self.embedder.infer_tag(t2_input, &t3_cat);
                }
                category = Some(t3_cat);
                tag = t3_tag;
                score = t3.score;
                tier = crate::models::Tier::Llm;
            }
        }

        Ok(ClassificationOutcome {
            category,
            tag,
            score,
            tier,
            embedding_json,
        })
    }
}
