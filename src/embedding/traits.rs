// Embedder trait — swap-ready abstraction.
//
// The pipeline only ever sees this trait, so the ONNX backend can be
// replaced by a remote embedding API (or a deterministic mock in tests)
// without touching the vectorizer or the ranker.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for mapping text to fixed-dimension vectors.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// The fixed dimensionality of every vector this embedder produces.
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one unit-norm vector per input text,
    /// in input order. An empty batch returns an empty Vec, never an error.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
