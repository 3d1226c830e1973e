// Crossref source — REST works endpoint.
//
// Selects works by publication date. Crossref date filters are inclusive,
// so the exclusive next_day bound maps to until-pub-date of the day before.
// Abstracts arrive as JATS XML fragments; markup is stripped before the
// text reaches the embedder.
//
// API docs: https://api.crossref.org/swagger-ui/index.html

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{CandidatePaper, FetchOptions, PaperSource};

/// Default Crossref works endpoint.
pub const DEFAULT_API_URL: &str = "https://api.crossref.org/works";

/// Fetcher for Crossref via its REST API.
pub struct CrossrefSource {
    client: reqwest::Client,
    base_url: String,
}

impl CrossrefSource {
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
impl PaperSource for CrossrefSource {
    fn name(&self) -> &'static str {
        "Crossref"
    }

    async fn fetch(
        &self,
        day: NaiveDate,
        next_day: NaiveDate,
        options: &FetchOptions,
    ) -> Result<Vec<CandidatePaper>> {
        // Inclusive filters: [day, next_day) becomes until-pub-date of
        // next_day - 1 (which is `day` itself for a one-day window).
        let until = next_day.checked_sub_days(Days::new(1)).unwrap_or(day);
        let filter = format!("from-pub-date:{day},until-pub-date:{until}");

        // Crossref caps rows at 1000
        let rows = options.per_page.min(1000);
        let mut papers = Vec::new();

        for page in 0..options.max_pages {
            let offset = (page * rows).to_string();
            let rows_str = rows.to_string();

            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("filter", filter.as_str()),
                    ("rows", rows_str.as_str()),
                    ("offset", offset.as_str()),
                ])
                .send()
                .await
                .context("Crossref API request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Crossref API returned {status}: {body}");
            }

            let parsed: CrossrefResponse = response
                .json()
                .await
                .context("Failed to parse Crossref response")?;

            let page_count = parsed.message.items.len();
            papers.extend(parsed.message.items.into_iter().map(work_to_candidate));

            debug!(page = page, page_count = page_count, "Fetched Crossref page");

            if page_count < rows {
                break;
            }
        }

        Ok(papers)
    }
}

fn work_to_candidate(work: CrossrefWork) -> CandidatePaper {
    let title = work.title.first().cloned().unwrap_or_default();
    let abstract_text = work
        .abstract_text
        .as_deref()
        .map(strip_jats)
        .unwrap_or_default();

    let mut paper = CandidatePaper::new(title, abstract_text);
    paper
        .extra
        .insert("source".to_string(), Value::String("Crossref".to_string()));
    if let Some(doi) = work.doi {
        paper.extra.insert("doi".to_string(), Value::String(doi));
    }
    if let Some(url) = work.url {
        paper.extra.insert("url".to_string(), Value::String(url));
    }
    if let Some(venue) = work.container_title.into_iter().next() {
        paper.extra.insert("venue".to_string(), Value::String(venue));
    }
    if !work.author.is_empty() {
        let names: Vec<Value> = work
            .author
            .iter()
            .map(|a| Value::String(a.display_name()))
            .collect();
        paper.extra.insert("authors".to_string(), Value::Array(names));
    }

    paper
}

/// Strip JATS/XML tags from a Crossref abstract and collapse whitespace.
fn strip_jats(text: &str) -> String {
    let tag = Regex::new(r"</?[^>]+>").expect("valid regex");
    let plain = tag.replace_all(text, " ");
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

// --- Crossref response types ---

#[derive(Deserialize)]
struct CrossrefResponse {
    message: CrossrefMessage,
}

#[derive(Deserialize)]
struct CrossrefMessage {
    #[serde(default)]
    items: Vec<CrossrefWork>,
}

#[derive(Deserialize)]
struct CrossrefWork {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
}

#[derive(Deserialize)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
}

impl CrossrefAuthor {
    fn display_name(&self) -> String {
        match (&self.given, &self.family) {
            (Some(given), Some(family)) => format!("{given} {family}"),
            (Some(given), None) => given.clone(),
            (None, Some(family)) => family.clone(),
            (None, None) => String::new(),
        }
    }
}
