// Unit tests for persona vectorization.
//
// Uses a deterministic mock embedder — no model files, no network.
// Covers the dimensionality guarantee (including the empty-profile case)
// and the unit-norm invariant for non-empty profiles.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use paperlens::embedding::traits::TextEmbedder;
use paperlens::persona::{paper_block, persona_vector};

/// Embeds by marker lookup: the first table key contained in the text wins.
/// Unknown texts embed to zero.
struct MockEmbedder {
    dims: usize,
    table: HashMap<&'static str, Vec<f32>>,
}

impl MockEmbedder {
    fn new(dims: usize, entries: &[(&'static str, &[f32])]) -> Self {
        Self {
            dims,
            table: entries.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
        }
    }
}

#[async_trait]
impl TextEmbedder for MockEmbedder {
    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                self.table
                    .iter()
                    .find(|(marker, _)| text.contains(*marker))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| vec![0.0; self.dims])
            })
            .collect())
    }
}

#[tokio::test]
async fn empty_profile_yields_zero_vector_of_full_dimension() {
    let embedder = MockEmbedder::new(4, &[]);
    let vector = persona_vector(&embedder, &[]).await.unwrap();
    assert_eq!(vector.len(), 4);
    assert!(vector.iter().all(|&x| x == 0.0));
}

#[tokio::test]
async fn nonempty_profile_has_unit_norm() {
    let embedder = MockEmbedder::new(
        3,
        &[("alpha", &[1.0, 0.0, 0.0]), ("beta", &[0.0, 1.0, 0.0])],
    );
    let texts = vec![paper_block(1, "alpha", "x"), paper_block(2, "beta", "y")];

    let vector = persona_vector(&embedder, &texts).await.unwrap();

    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!(
        (norm - 1.0).abs() < 1e-6,
        "Persona vector should be unit norm, got {norm}"
    );
}

#[tokio::test]
async fn persona_is_normalized_mean_of_embeddings() {
    // Mean of (1,0,0) and (0,1,0) is (0.5,0.5,0), normalized to (√½,√½,0)
    let embedder = MockEmbedder::new(
        3,
        &[("alpha", &[1.0, 0.0, 0.0]), ("beta", &[0.0, 1.0, 0.0])],
    );
    let texts = vec![paper_block(1, "alpha", "x"), paper_block(2, "beta", "y")];

    let vector = persona_vector(&embedder, &texts).await.unwrap();

    let expected = (0.5_f32).sqrt();
    assert!((vector[0] - expected).abs() < 1e-5);
    assert!((vector[1] - expected).abs() < 1e-5);
    assert!(vector[2].abs() < 1e-6);
}

#[tokio::test]
async fn single_text_profile_keeps_embedding_direction() {
    let embedder = MockEmbedder::new(3, &[("Only", &[0.0, 3.0, 4.0])]);
    let texts = vec![paper_block(1, "Only", "x")];

    let vector = persona_vector(&embedder, &texts).await.unwrap();

    // Direction preserved, magnitude normalized away
    assert!(vector[0].abs() < 1e-6);
    assert!((vector[1] - 0.6).abs() < 1e-5);
    assert!((vector[2] - 0.8).abs() < 1e-5);
}

#[tokio::test]
async fn output_dimension_matches_embedder_regardless_of_input_size() {
    let embedder = MockEmbedder::new(7, &[("alpha", &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);

    for texts in [vec![], vec![paper_block(1, "alpha", "x")]] {
        let vector = persona_vector(&embedder, &texts).await.unwrap();
        assert_eq!(vector.len(), 7);
    }
}
