// Bibliographic sources — the candidate-paper fetchers.
//
// Each source queries one external catalog (arXiv, Crossref, OpenAlex) for
// papers published on the target day. The PaperSource trait is the
// swap-ready abstraction: the aggregator works against it, so adding a
// source never touches the ranking pipeline.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod arxiv;
pub mod crossref;
pub mod openalex;

/// A paper fetched from a bibliographic source, not yet filtered or ranked.
///
/// Sources provide heterogeneous fields — only title and abstract are
/// shared. Everything else lands in `extra` and is carried through the
/// pipeline unmodified, so the rendered report can show whatever metadata
/// the source happened to have (DOI, link, authors, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePaper {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl CandidatePaper {
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// True when both title and abstract are empty after trimming.
    /// Such records carry nothing to embed and are dropped by the filter.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.abstract_text.trim().is_empty()
    }

    /// Convenience accessor for a string field in the pass-through metadata.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Pagination settings for one source, passed through without validation.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Results requested per page (sources cap this at their own API limit)
    pub per_page: usize,
    /// How many pages to fetch before giving up
    pub max_pages: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_pages: 3,
        }
    }
}

/// Trait for fetching candidate papers from one bibliographic catalog.
///
/// `next_day` is the exclusive upper bound of the date range. Each source
/// owns its pagination and error handling; the aggregator isolates a
/// failing source so the others still contribute.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Human-readable source name — also the key for per-source options.
    fn name(&self) -> &'static str;

    /// Fetch papers published within [day, next_day).
    async fn fetch(
        &self,
        day: NaiveDate,
        next_day: NaiveDate,
        options: &FetchOptions,
    ) -> Result<Vec<CandidatePaper>>;
}

/// User agent sent to every catalog API. Polite pools (Crossref, OpenAlex)
/// route identified clients to faster servers.
pub(crate) const USER_AGENT: &str = "paperlens/0.1 (daily paper recommendations)";
