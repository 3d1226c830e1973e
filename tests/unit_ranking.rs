// Unit tests for candidate filtering and similarity ranking.
//
// The mock embedder maps marker substrings to fixed vectors, so every
// similarity score here is a hand-checkable dot product.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use paperlens::embedding::traits::TextEmbedder;
use paperlens::ranking::{filter_candidates, rank};
use paperlens::sources::CandidatePaper;

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
async fn empty_candidate_set_returns_empty_without_error() {
    let embedder = MockEmbedder::new(3, &[]);
    let result = rank(&embedder, &[1.0, 0.0, 0.0], vec![], &[], 5)
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn results_are_sorted_descending_with_length_min_k_n() {
    let embedder = MockEmbedder::new(3, &[
        ("Low", &[0.1, 0.0, 0.0]),
        ("High", &[0.9, 0.0, 0.0]),
        ("Mid", &[0.5, 0.0, 0.0]),
    ]);
    let persona = vec![1.0, 0.0, 0.0];

    let raw = vec![
        CandidatePaper::new("Low", "a"),
        CandidatePaper::new("High", "b"),
        CandidatePaper::new("Mid", "c"),
    ];
    let (candidates, texts) = filter_candidates(raw);

    let result = rank(&embedder, &persona, candidates.clone(), &texts, 10)
        .await
        .unwrap();
    assert_eq!(result.len(), 3, "K > N returns all candidates");
    assert_eq!(result[0].paper.title, "High");
    assert_eq!(result[1].paper.title, "Mid");
    assert_eq!(result[2].paper.title, "Low");
    assert!(result[0].similarity >= result[1].similarity);
    assert!(result[1].similarity >= result[2].similarity);

    let top_two = rank(&embedder, &persona, candidates, &texts, 2)
        .await
        .unwrap();
    assert_eq!(top_two.len(), 2);
}

#[tokio::test]
async fn spec_scenario_two_profile_papers_three_candidates_k1() {
    // Profile: P1 ("A"/"x"), P2 ("B"/"y"). Candidates: C1, blank, C3. K=1.
    let embedder = MockEmbedder::new(3, &[
        ("C1", &[0.8, 0.2, 0.0]),
        ("C3", &[0.3, 0.1, 0.0]),
    ]);
    // Persona built elsewhere; a fixed unit vector is enough here
    let persona = vec![1.0, 0.0, 0.0];

    let raw = vec![
        CandidatePaper::new("C1", "z"),
        CandidatePaper::new("", ""),
        CandidatePaper::new("C3", "w"),
    ];
    let (candidates, texts) = filter_candidates(raw);
    assert_eq!(candidates.len(), 2, "Blank candidate C2 dropped");

    let result = rank(&embedder, &persona, candidates, &texts, 1)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].paper.title, "C1");
    // Similarity equals the dot product of the mocked embedding and persona
    assert!((result[0].similarity - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn original_fields_survive_with_only_similarity_added() {
    let embedder = MockEmbedder::new(2, &[("Kept", &[1.0, 0.0])]);
    let persona = vec![1.0, 0.0];

    let mut paper = CandidatePaper::new("Kept", "abstract text");
    paper
        .extra
        .insert("doi".to_string(), Value::String("10.1/abc".to_string()));
    paper
        .extra
        .insert("venue".to_string(), Value::String("NeurIPS".to_string()));

    let (candidates, texts) = filter_candidates(vec![paper]);
    let result = rank(&embedder, &persona, candidates, &texts, 1)
        .await
        .unwrap();

    let json = serde_json::to_value(&result[0]).unwrap();
    assert_eq!(json["title"], "Kept");
    assert_eq!(json["abstract"], "abstract text");
    assert_eq!(json["doi"], "10.1/abc");
    assert_eq!(json["venue"], "NeurIPS");
    assert!((json["Similarity"].as_f64().unwrap() - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn ties_resolve_to_aggregation_order() {
    let embedder = MockEmbedder::new(2, &[
        ("First", &[0.5, 0.0]),
        ("Second", &[0.5, 0.0]),
    ]);
    let persona = vec![1.0, 0.0];

    let raw = vec![
        CandidatePaper::new("First", "a"),
        CandidatePaper::new("Second", "b"),
    ];
    let (candidates, texts) = filter_candidates(raw);
    let result = rank(&embedder, &persona, candidates, &texts, 2)
        .await
        .unwrap();

    assert_eq!(result[0].paper.title, "First");
    assert_eq!(result[1].paper.title, "Second");
}

#[test]
fn whitespace_only_records_are_excluded() {
    let raw = vec![
        CandidatePaper::new(" ", "\t\n"),
        CandidatePaper::new("Title only", ""),
        CandidatePaper::new("", "abstract only"),
    ];
    let (kept, texts) = filter_candidates(raw);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].title, "Title only");
    assert_eq!(kept[1].abstract_text, "abstract only");
    assert_eq!(texts.len(), 2);
}
