// Candidate filtering and similarity ranking.
//
// The filter drops records with nothing to embed and builds the parallel
// text blocks. The ranker embeds those blocks in one batch, scores each
// against the persona vector by dot product (cosine similarity — both
// sides are unit-norm), and keeps the top K with a stable descending sort.

use std::cmp::Ordering;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::embedding::traits::TextEmbedder;
use crate::persona::paper_block;
use crate::sources::CandidatePaper;

/// A candidate paper with its similarity to the persona vector attached.
///
/// The paper's original fields pass through untouched; `Similarity` is the
/// only addition.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRecommendation {
    #[serde(flatten)]
    pub paper: CandidatePaper,
    #[serde(rename = "Similarity")]
    pub similarity: f32,
}

/// Drop blank candidates and build their embedding texts.
///
/// A candidate is blank when both title and abstract are empty or
/// whitespace-only after trimming. Kept candidates stay in aggregation
/// order; their text blocks are numbered 1-based over the kept set (a
/// display index only, not a stable identifier).
pub fn filter_candidates(raw: Vec<CandidatePaper>) -> (Vec<CandidatePaper>, Vec<String>) {
    let mut kept = Vec::new();
    let mut texts = Vec::new();

    for paper in raw {
        if paper.is_blank() {
            continue;
        }
        texts.push(paper_block(
            kept.len() + 1,
            &paper.title,
            &paper.abstract_text,
        ));
        kept.push(paper);
    }

    (kept, texts)
}

/// Embed the candidate texts and return the top `k` by similarity.
///
/// `texts` must be parallel to `candidates` (the output of
/// [`filter_candidates`]). An empty candidate set short-circuits to an
/// empty result without calling the embedder. `k` larger than the
/// candidate count returns everything, still sorted.
pub async fn rank(
    embedder: &dyn TextEmbedder,
    persona: &[f32],
    candidates: Vec<CandidatePaper>,
    texts: &[String],
    k: usize,
) -> Result<Vec<RankedRecommendation>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let embeddings = embedder.encode(texts).await?;
    let similarities: Vec<f32> = embeddings.iter().map(|e| dot(e, persona)).collect();

    let order = top_k_indices(&similarities, k);
    info!(
        candidates = candidates.len(),
        selected = order.len(),
        "Ranked candidate papers"
    );

    Ok(order
        .into_iter()
        .map(|i| RankedRecommendation {
            paper: candidates[i].clone(),
            similarity: similarities[i],
        })
        .collect())
}

/// Dot product over the common prefix of the two vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Indices of the top `k` similarities, descending.
///
/// The sort is stable, so equal similarities keep their original
/// (aggregation) order.
pub fn top_k_indices(similarities: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..similarities.len()).collect();
    indices.sort_by(|&a, &b| {
        similarities[b]
            .partial_cmp(&similarities[a])
            .unwrap_or(Ordering::Equal)
    });
    indices.truncate(k);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_of_orthogonal_is_zero() {
        assert_eq!(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn dot_stops_at_shorter_vector() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[1.0, 1.0]), 3.0);
    }

    #[test]
    fn top_k_sorts_descending() {
        let order = top_k_indices(&[0.1, 0.9, 0.5], 3);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn top_k_truncates_to_k() {
        let order = top_k_indices(&[0.1, 0.9, 0.5, 0.7], 2);
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn top_k_larger_than_len_returns_all() {
        let order = top_k_indices(&[0.2, 0.1], 10);
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn ties_keep_aggregation_order() {
        let order = top_k_indices(&[0.5, 0.5, 0.5], 3);
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn top_k_of_empty_is_empty() {
        assert!(top_k_indices(&[], 5).is_empty());
    }

    #[test]
    fn filter_drops_blank_and_renumbers() {
        let raw = vec![
            CandidatePaper::new("C1", "z"),
            CandidatePaper::new("", "  \n"),
            CandidatePaper::new("C3", "w"),
        ];
        let (kept, texts) = filter_candidates(raw);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].title, "C1");
        assert_eq!(kept[1].title, "C3");
        assert!(texts[0].starts_with("## Paper 1"));
        assert!(texts[1].starts_with("## Paper 2"));
    }

    #[test]
    fn filter_keeps_title_only_records() {
        let (kept, _) = filter_candidates(vec![CandidatePaper::new("Only title", "")]);
        assert_eq!(kept.len(), 1);
    }
}
