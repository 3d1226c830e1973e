// Persona vectorization — one vector for the reader's interests.
//
// The interest profile is the mean of the embedded profile texts,
// L2-normalized. Candidate papers are later scored by dot product against
// this vector, so a higher score means "closer to what the reader already
// collects".

use anyhow::Result;

use crate::embedding::traits::TextEmbedder;

/// Epsilon added to the norm before dividing, so a near-zero mean vector
/// never divides by zero.
const NORM_EPSILON: f32 = 1e-9;

/// Format one paper as a numbered text block.
///
/// Profile entries and candidate papers must share this exact format —
/// the similarity scores are only meaningful when both sides of the dot
/// product were embedded from identically-shaped text.
pub fn paper_block(index: usize, title: &str, abstract_text: &str) -> String {
    format!("## Paper {index}\n- Title: {title}\n- Abstract: {abstract_text}")
        .trim()
        .to_string()
}

/// Build the persona vector from the profile texts.
///
/// Embeds all texts in one batch and averages them. With no texts at all
/// (an empty Zotero library) this returns a zero vector of the embedder's
/// dimensionality — every candidate then scores 0.0 and ordering falls
/// back to aggregation order.
pub async fn persona_vector(embedder: &dyn TextEmbedder, texts: &[String]) -> Result<Vec<f32>> {
    let embeddings = embedder.encode(texts).await?;

    if embeddings.is_empty() {
        return Ok(vec![0.0; embedder.dimensions()]);
    }

    let mut mean = mean_vector(&embeddings, embedder.dimensions());
    l2_normalize(&mut mean);
    Ok(mean)
}

/// Element-wise mean of the given vectors, padded/truncated to `dim`.
pub fn mean_vector(embeddings: &[Vec<f32>], dim: usize) -> Vec<f32> {
    let mut mean = vec![0.0_f32; dim];
    if embeddings.is_empty() {
        return mean;
    }

    for emb in embeddings {
        for (i, &val) in emb.iter().enumerate().take(dim) {
            mean[i] += val;
        }
    }

    let n = embeddings.len() as f32;
    for val in &mut mean {
        *val /= n;
    }

    mean
}

/// Divide a vector by its Euclidean norm (plus epsilon).
///
/// A zero vector stays zero — the epsilon only guards the division.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    for val in vector.iter_mut() {
        *val /= norm + NORM_EPSILON;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_block_is_numbered_and_trimmed() {
        let block = paper_block(3, "A Title", "An abstract.");
        assert_eq!(block, "## Paper 3\n- Title: A Title\n- Abstract: An abstract.");
    }

    #[test]
    fn mean_vector_of_two() {
        let mean = mean_vector(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]], 3);
        assert_eq!(mean, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn mean_vector_empty_is_zero() {
        let mean = mean_vector(&[], 4);
        assert_eq!(mean, vec![0.0; 4]);
    }

    #[test]
    fn mean_vector_pads_short_inputs_to_dim() {
        let mean = mean_vector(&[vec![2.0]], 3);
        assert_eq!(mean, vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn normalize_produces_unit_norm() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_vector_stays_zero() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));
    }
}
