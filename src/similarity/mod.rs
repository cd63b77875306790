//! Cover-similarity grouper (C7): union-find over a pairwise cosine matrix, rebuilt from scratch
//! on every pass. Reuses `embed::cosine_similarity`'s single-pass fold.

use crate::embed::cosine_similarity;
use crate::error::Result;
use crate::models::{CoverPage, CoverSimilarityGroup};
use crate::store::Store;
use std::collections::HashMap;

const SIMILARITY_THRESHOLD: f32 = 0.80;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Parse every cover page's embedding, group mutually-similar ones (cosine ≥ 0.80) via
/// union-find, and replace the whole `cover_similarity_groups` table with the result.
pub fn rebuild_groups(store: &Store, embedder: &crate::embed::EmbeddingProvider) -> Result<()> {
    let covers: Vec<CoverPage> = store
        .all_covers_with_embeddings()?
        .into_iter()
        .filter_map(|c| {
            let vec: Vec<f32> = serde_json::from_str(&c.embedding).ok()?;
            Some((c, vec))
        })
        .collect();

    let n = covers.len();
    if n == 0 {
        store.replace_similarity_groups(&[])?;
        return Ok(());
    }

    let mut sim = vec![vec![0.0f32; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let score = cosine_similarity(&covers[i].1, &covers[j].1);
            sim[i][j] = score;
            sim[j][i] = score;
        }
    }

    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if sim[i][j] >= SIMILARITY_THRESHOLD {
                uf.union(i, j);
            }
        }
    }

    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..n {
        let root = uf.find(i);
        components.entry(root).or_default().push(i);
    }

    let mut rows = Vec::new();
    for members in components.values() {
        if members.len() < 2 {
            continue;
        }
        let group_id = uuid::Uuid::new_v4().to_string();

        let cover_texts: Vec<&str> = members.iter().map(|&i| covers[i].0.cover_text.as_str()).collect();
        let concat_text = cover_texts.join("\n");

        let mut category_counts: HashMap<String, usize> = HashMap::new();
        for &i in members {
            let file_id = covers[i].0.file_id;
            if let Some(cat) = store
                .latest_auto_classification(file_id)?
                .and_then(|c| c.category)
            {
                *category_counts.entry(cat).or_insert(0) += 1;
            }
        }
        let dominant_category = category_counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(cat, _)| cat);

        let auto_tag = dominant_category
            .as_deref()
            .and_then(|cat| embedder.infer_tag(&concat_text, cat));

        for &i in members {
            let others_avg = {
                let sum: f32 = members.iter().filter(|&&j| j != i).map(|&j| sim[i][j]).sum();
                sum / (members.len() - 1) as f32
            };
            rows.push(CoverSimilarityGroup {
                id: 0,
                group_id: group_id.clone(),
                file_id: covers[i].0.file_id,
                similarity_score: others_avg,
                auto_tag: auto_tag.clone(),
            });
        }
    }

    store.replace_similarity_groups(&rows)
}
