// OpenAlex source — works endpoint.
//
// OpenAlex doesn't return abstracts as plain text; it ships an inverted
// index (word -> positions) for licensing reasons. We rebuild the abstract
// by placing each word at its positions and joining.
//
// API docs: https://docs.openalex.org/api-entities/works

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{CandidatePaper, FetchOptions, PaperSource};

/// Default OpenAlex works endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openalex.org/works";

/// Fetcher for OpenAlex via its REST API.
pub struct OpenAlexSource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexSource {
    /// Create a source pointing at the given endpoint
    /// (normally [`DEFAULT_API_URL`]).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaperSource for OpenAlexSource {
    fn name(&self) -> &'static str {
        "OpenAlex"
    }

    async fn fetch(
        &self,
        day: NaiveDate,
        next_day: NaiveDate,
        options: &FetchOptions,
    ) -> Result<Vec<CandidatePaper>> {
        // to_publication_date is inclusive; next_day is exclusive
        let until = next_day.checked_sub_days(Days::new(1)).unwrap_or(day);
        let filter = format!("from_publication_date:{day},to_publication_date:{until}");

        // OpenAlex caps per-page at 200
        let per_page = options.per_page.min(200).to_string();
        let mut papers = Vec::new();

        // OpenAlex pages are 1-based
        for page in 1..=options.max_pages {
            let page_str = page.to_string();

            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("filter", filter.as_str()),
                    ("per-page", per_page.as_str()),
                    ("page", page_str.as_str()),
                ])
                .send()
                .await
                .context("OpenAlex API request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("OpenAlex API returned {status}: {body}");
            }

            let parsed: OpenAlexResponse = response
                .json()
                .await
                .context("Failed to parse OpenAlex response")?;

            let page_count = parsed.results.len();
            papers.extend(parsed.results.into_iter().map(work_to_candidate));

            debug!(page = page, page_count = page_count, "Fetched OpenAlex page");

            if page_count < options.per_page.min(200) {
                break;
            }
        }

        Ok(papers)
    }
}

fn work_to_candidate(work: OpenAlexWork) -> CandidatePaper {
    let abstract_text = work
        .abstract_inverted_index
        .as_ref()
        .map(reconstruct_abstract)
        .unwrap_or_default();

    let mut paper = CandidatePaper::new(work.display_name.unwrap_or_default(), abstract_text);
    paper
        .extra
        .insert("source".to_string(), Value::String("OpenAlex".to_string()));
    if let Some(id) = work.id {
        paper.extra.insert("id".to_string(), Value::String(id));
    }
    if let Some(doi) = work.doi {
        paper.extra.insert("doi".to_string(), Value::String(doi.clone()));
        paper.extra.insert("url".to_string(), Value::String(doi));
    }
    if let Some(date) = work.publication_date {
        paper
            .extra
            .insert("published".to_string(), Value::String(date));
    }
    if !work.authorships.is_empty() {
        let names: Vec<Value> = work
            .authorships
            .iter()
            .filter_map(|a| a.author.display_name.clone())
            .map(Value::String)
            .collect();
        paper.extra.insert("authors".to_string(), Value::Array(names));
    }

    paper
}

/// Rebuild an abstract from OpenAlex's inverted index.
///
/// The index maps each word to the positions where it occurs. Positions
/// are not guaranteed contiguous; gaps are simply skipped when joining.
pub fn reconstruct_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let max_pos = index
        .values()
        .flat_map(|positions| positions.iter())
        .copied()
        .max();

    let Some(max_pos) = max_pos else {
        return String::new();
    };

    let mut words: Vec<&str> = vec![""; max_pos + 1];
    for (word, positions) in index {
        for &pos in positions {
            words[pos] = word.as_str();
        }
    }

    words
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// --- OpenAlex response types ---

#[derive(Deserialize)]
struct OpenAlexResponse {
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(Deserialize)]
struct OpenAlexWork {
    id: Option<String>,
    display_name: Option<String>,
    doi: Option<String>,
    publication_date: Option<String>,
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    #[serde(default)]
    authorships: Vec<OpenAlexAuthorship>,
}

#[derive(Deserialize)]
struct OpenAlexAuthorship {
    author: OpenAlexAuthor,
}

#[derive(Deserialize)]
struct OpenAlexAuthor {
    display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &[usize])]) -> HashMap<String, Vec<usize>> {
        entries
            .iter()
            .map(|(w, ps)| (w.to_string(), ps.to_vec()))
            .collect()
    }

    #[test]
    fn reconstructs_word_order() {
        let idx = index(&[("papers", &[2]), ("ranks", &[1]), ("PaperLens", &[0])]);
        assert_eq!(reconstruct_abstract(&idx), "PaperLens ranks papers");
    }

    #[test]
    fn repeated_words_fill_all_positions() {
        let idx = index(&[("the", &[0, 2]), ("end", &[3]), ("of", &[1])]);
        assert_eq!(reconstruct_abstract(&idx), "the of the end");
    }

    #[test]
    fn empty_index_is_empty_string() {
        assert_eq!(reconstruct_abstract(&HashMap::new()), "");
    }

    #[test]
    fn gaps_in_positions_are_skipped() {
        let idx = index(&[("alpha", &[0]), ("omega", &[5])]);
        assert_eq!(reconstruct_abstract(&idx), "alpha omega");
    }

    #[test]
    fn work_without_abstract_converts_to_blank_abstract() {
        let json = serde_json::json!({
            "id": "https://openalex.org/W1",
            "display_name": "A Title",
            "doi": "https://doi.org/10.1/w1",
            "publication_date": "2024-01-09",
            "authorships": [{"author": {"display_name": "Ada Lovelace"}}]
        });
        let work: OpenAlexWork = serde_json::from_value(json).unwrap();
        let paper = work_to_candidate(work);
        assert_eq!(paper.title, "A Title");
        assert!(paper.abstract_text.is_empty());
        assert_eq!(paper.extra_str("url"), Some("https://doi.org/10.1/w1"));
        assert_eq!(paper.extra["authors"].as_array().unwrap()[0], "Ada Lovelace");
    }
}
