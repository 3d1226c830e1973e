// Aggregation — fan out to every source, merge in configured order.
//
// Fetchers are independent, so they run concurrently. The merge is still
// deterministic: results are buffered per source and concatenated in the
// order the sources were registered, preserving each source's own order.
//
// A failing source never aborts the run. Its error is captured alongside
// the source name and the remaining sources' papers are still used.

use std::collections::HashMap;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use crate::sources::{CandidatePaper, FetchOptions, PaperSource};

/// One source that failed during aggregation.
pub struct SourceFailure {
    pub source: String,
    pub error: anyhow::Error,
}

/// The merged candidate set plus any per-source failures.
pub struct AggregateOutcome {
    pub papers: Vec<CandidatePaper>,
    pub failures: Vec<SourceFailure>,
}

/// Fans out to the configured bibliographic sources.
pub struct Aggregator {
    sources: Vec<Box<dyn PaperSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Box<dyn PaperSource>>) -> Self {
        Self { sources }
    }

    /// Names of the registered sources, in configured order.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Fetch candidates from every source for [day, next_day).
    ///
    /// Per-source options come from `overrides` keyed by source name;
    /// sources without an entry use their defaults. No deduplication is
    /// applied across sources — a paper indexed by two catalogs appears
    /// twice.
    pub async fn fetch_all(
        &self,
        day: NaiveDate,
        next_day: NaiveDate,
        overrides: &HashMap<String, FetchOptions>,
    ) -> AggregateOutcome {
        let fetches = self.sources.iter().map(|source| {
            let options = overrides
                .get(source.name())
                .copied()
                .unwrap_or_default();
            async move { source.fetch(day, next_day, &options).await }
        });

        // join_all preserves input order, which keeps the merge deterministic
        let results = join_all(fetches).await;

        let mut papers = Vec::new();
        let mut failures = Vec::new();

        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(fetched) => {
                    info!(
                        source = source.name(),
                        count = fetched.len(),
                        "Source fetch complete"
                    );
                    papers.extend(fetched);
                }
                Err(error) => {
                    warn!(
                        source = source.name(),
                        error = %error,
                        "Source fetch failed, continuing with remaining sources"
                    );
                    failures.push(SourceFailure {
                        source: source.name().to_string(),
                        error,
                    });
                }
            }
        }

        AggregateOutcome { papers, failures }
    }
}
