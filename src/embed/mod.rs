//! Embedding provider (C2): text -> unit-vector, category prototype cache with learnable drift,
//! and content-tag inference.
//!
//! The cosine math is the single-pass fold from the teacher's vector embedder, carried over
//! unchanged. The prototype/feedback machinery is grounded on the original engine's Tier-2 module:
//! per-keyword-mean prototypes, an exponential moving average on manual-correction feedback, and
//! a durable JSON override file.

mod keywords;

use crate::error::Result;
use fastembed::{InitOptions, TextEmbedding};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, RwLock};

const FEEDBACK_LEARNING_RATE: f32 = 0.05;
const CATEGORY_MATCH_THRESHOLD: f32 = 0.3;
const TAG_MATCH_THRESHOLD: f32 = 0.35;
const CLASSIFY_TEXT_MAX_LEN: usize = 2000;
const COVER_TEXT_MAX_LEN: usize = 500;

pub struct ClassifyResult {
    pub category: Option<String>,
    pub score: f32,
    pub embedding_json: String,
}

pub struct EmbeddingProvider {
    model: OnceLock<TextEmbedding>,
    prototypes: RwLock<HashMap<String, Vec<f32>>>,
    tag_embeddings: RwLock<HashMap<String, HashMap<String, Vec<f32>>>>,
    custom_tag_candidates: RwLock<HashMap<String, Vec<String>>>,
    feedback_path: Mutex<PathBuf>,
}

impl EmbeddingProvider {
    /// Construct with built-in category prototypes, then merge in any durable feedback override.
    pub fn new(feedback_path: PathBuf) -> Result<Self> {
        let provider = Self {
            model: OnceLock::new(),
            prototypes: RwLock::new(HashMap::new()),
            tag_embeddings: RwLock::new(HashMap::new()),
            custom_tag_candidates: RwLock::new(HashMap::new()),
            feedback_path: Mutex::new(feedback_path),
        };
        provider.rebuild_builtin_prototypes()?;
        provider.load_feedback_overrides();
        Ok(provider)
    }

    fn model(&self) -> &TextEmbedding {
        self.model.get_or_init(|| {
            TextEmbedding::try_new(InitOptions::default())
                .expect("failed to initialize embedding model")
        })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        self.model()
            .embed(vec![text], None)
            .ok()
            .and_then(|mut v| v.pop())
            .unwrap_or_default()
    }

    fn rebuild_builtin_prototypes(&self) -> Result<()> {
        let mut prototypes = self.prototypes.write().unwrap();
        for &category in keywords::CATEGORIES {
            let kws = keywords::category_keywords(category);
            let mean = self.mean_embedding(kws);
            prototypes.insert(category.to_string(), mean);
        }
        Ok(())
    }

    fn mean_embedding(&self, texts: &[&str]) -> Vec<f32> {
        if texts.is_empty() {
            return Vec::new();
        }
        let embeddings: Vec<Vec<f32>> = texts.iter().map(|t| self.embed_one(t)).collect();
        let dim = embeddings.iter().map(|e| e.len()).max().unwrap_or(0);
        let mut mean = vec![0.0f32; dim];
        for emb in &embeddings {
            for (i, v) in emb.iter().enumerate() {
                mean[i] += v;
            }
        }
        let n = embeddings.len() as f32;
        for v in &mut mean {
            *v /= n;
        }
        mean
    }

    fn load_feedback_overrides(&self) {
        let path = self.feedback_path.lock().unwrap().clone();
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return;
        };
        let Ok(saved) = serde_json::from_str::<HashMap<String, Vec<f32>>>(&contents) else {
            return;
        };
        let mut prototypes = self.prototypes.write().unwrap();
        for (category, vec) in saved {
            if prototypes.contains_key(&category) {
                prototypes.insert(category, vec);
            }
        }
    }

    /// Persist the full prototype map, atomically (temp file + rename), so feedback survives a
    /// restart.
    fn save_feedback_overrides(&self) -> Result<()> {
        let prototypes = self.prototypes.read().unwrap();
        let serializable: HashMap<&String, &Vec<f32>> = prototypes.iter().collect();
        let json = serde_json::to_vec(&serializable).unwrap_or_default();

        let path = self.feedback_path.lock().unwrap().clone();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut f = std::fs::File::create(&tmp_path)?;
            use std::io::Write;
            f.write_all(&json)?;
            f.sync_all()?;
        }
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Embed `text` (truncated to 2000 chars) and compare against every category prototype.
    /// Below the match threshold, `category` is `None` but the raw score is still reported.
    pub fn classify_text(&self, text: &str) -> ClassifyResult {
        let truncated: String = text.trim().chars().take(CLASSIFY_TEXT_MAX_LEN).collect();
        if truncated.is_empty() {
            return ClassifyResult {
                category: None,
                score: 0.0,
                embedding_json: String::new(),
            };
        }
        let embedding = self.embed_one(&truncated);

        let mut best_category: Option<String> = None;
        let mut best_score = 0.0f32;
        for (category, proto) in self.prototypes.read().unwrap().iter() {
            let score = cosine_similarity(&embedding, proto);
            if score > best_score {
                best_score = score;
                best_category = Some(category.clone());
            }
        }

        ClassifyResult {
            category: if best_score > CATEGORY_MATCH_THRESHOLD {
                best_category
            } else {
                None
            },
            score: best_score,
            embedding_json: serde_json::to_string(&embedding).unwrap_or_default(),
        }
    }

    fn tag_embeddings_for(&self, category: &str) -> HashMap<String, Vec<f32>> {
        if let Some(existing) = self.tag_embeddings.read().unwrap().get(category) {
            return existing.clone();
        }
        let mut candidates: Vec<String> = keywords::tag_candidates(category)
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(custom) = self.custom_tag_candidates.read().unwrap().get(category) {
            candidates.extend(custom.iter().cloned());
        }
        let mut seen = std::collections::HashSet::new();
        candidates.retain(|c| seen.insert(c.clone()));

        let embeddings: HashMap<String, Vec<f32>> = candidates
            .into_iter()
            .map(|tag| {
                let emb = self.embed_one(&tag);
                (tag, emb)
            })
            .collect();
        self.tag_embeddings
            .write()
            .unwrap()
            .insert(category.to_string(), embeddings.clone());
        embeddings
    }

    /// Finer-grained tag within `category`, by cosine similarity against its tag candidates
    /// (built-in plus any registered custom keywords, de-duplicated).
    pub fn infer_tag(&self, text: &str, category: &str) -> Option<String> {
        if text.trim().is_empty() || category.is_empty() {
            return None;
        }
        let candidates = self.tag_embeddings_for(category);
        if candidates.is_empty() {
            return None;
        }
        let truncated: String = text.trim().chars().take(CLASSIFY_TEXT_MAX_LEN).collect();
        let text_emb = self.embed_one(&truncated);

        let mut best_tag = None;
        let mut best_score = 0.0f32;
        for (tag, tag_emb) in &candidates {
            let score = cosine_similarity(&text_emb, tag_emb);
            if score > best_score {
                best_score = score;
                best_tag = Some(tag.clone());
            }
        }
        if best_score >= TAG_MATCH_THRESHOLD {
            best_tag
        } else {
            None
        }
    }

    /// Nudge `category`'s prototype toward `text`'s embedding by a 0.05 exponential moving
    /// average, L2-renormalize, and persist. No-op if `category` isn't a known prototype.
    pub fn apply_feedback(&self, text: &str, category: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let truncated: String = text.trim().chars().take(CLASSIFY_TEXT_MAX_LEN).collect();
        let text_emb = self.embed_one(&truncated);

        let mut updated = None;
        {
            let mut prototypes = self.prototypes.write().unwrap();
            if let Some(current) = prototypes.get(category) {
                let mut next: Vec<f32> = current
                    .iter()
                    .zip(text_emb.iter())
                    .map(|(c, t)| (1.0 - FEEDBACK_LEARNING_RATE) * c + FEEDBACK_LEARNING_RATE * t)
                    .collect();
                let norm = l2_norm(&next);
                if norm > 0.0 {
                    for v in &mut next {
                        *v /= norm;
                    }
                }
                prototypes.insert(category.to_string(), next.clone());
                updated = Some(next);
            }
        }
        if updated.is_some() {
            self.save_feedback_overrides()?;
        }
        Ok(())
    }

    /// Drop all non-builtin prototypes/tag caches and register the given custom categories,
    /// then re-apply the durable feedback override (it may contain corrections for custom
    /// categories created in a previous session).
    pub fn load_custom_categories(&self, categories: &[crate::models::CustomCategory]) -> Result<()> {
        let builtin: std::collections::HashSet<&str> = keywords::CATEGORIES.iter().copied().collect();
        {
            let mut prototypes = self.prototypes.write().unwrap();
            let mut tag_embeddings = self.tag_embeddings.write().unwrap();
            let mut custom_tags = self.custom_tag_candidates.write().unwrap();
            prototypes.retain(|k, _| builtin.contains(k.as_str()));
            tag_embeddings.retain(|k, _| builtin.contains(k.as_str()));
            custom_tags.clear();

            for entry in categories {
                let keyword_refs: Vec<&str> = entry.keywords.iter().map(|s| s.as_str()).collect();
                let proto = if keyword_refs.is_empty() {
                    self.embed_one(&entry.name)
                } else {
                    self.mean_embedding(&keyword_refs)
                };
                prototypes.insert(entry.name.clone(), proto);
                if !entry.keywords.is_empty() {
                    custom_tags.insert(entry.name.clone(), entry.keywords.clone());
                }
            }
        }
        self.load_feedback_overrides();
        Ok(())
    }

    /// Embed cover text (truncated to 500 chars) and serialize to JSON, for `CoverPage.embedding`.
    pub fn compute_embedding(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let truncated: String = text.trim().chars().take(COVER_TEXT_MAX_LEN).collect();
        let emb = self.embed_one(&truncated);
        serde_json::to_string(&emb).ok()
    }

    pub fn compute_similarity(embedding_json_a: &str, embedding_json_b: &str) -> f32 {
        let (Ok(a), Ok(b)) = (
            serde_json::from_str::<Vec<f32>>(embedding_json_a),
            serde_json::from_str::<Vec<f32>>(embedding_json_b),
        ) else {
            return 0.0;
        };
        cosine_similarity(&a, &b)
    }
}

/// Single-pass cosine similarity: dot product and both norms accumulated in one fold.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (dot, norm_a_sq, norm_b_sq) = a.iter().zip(b.iter()).fold(
        (0.0f32, 0.0f32, 0.0f32),
        |(dot, na, nb), (&x, &y)| (dot + x * y, na + x * x, nb + y * y),
    );
    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return 0.0;
    }
    dot / (norm_a_sq * norm_b_sq).sqrt()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.001);
    }

    #[test]
    fn cosine_similarity_mismatched_length() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_similarity_empty() {
        let a: Vec<f32> = vec![];
        let b: Vec<f32> = vec![];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
