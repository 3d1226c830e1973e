// arXiv source — Atom feed over the export API.
//
// arXiv has no JSON endpoint; the query API returns an Atom document that
// we parse with quick-xml. Papers are selected by submittedDate range and
// paged with start/max_results.
//
// API docs: https://info.arxiv.org/help/api/user-manual.html

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use tracing::debug;

use super::{CandidatePaper, FetchOptions, PaperSource};

/// Default arXiv query endpoint.
pub const DEFAULT_API_URL: &str = "https://export.arxiv.org/api/query";

/// Fetcher for arXiv via its Atom export API.
pub struct ArxivSource {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivSource {
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
impl PaperSource for ArxivSource {
    fn name(&self) -> &'static str {
        "arXiv"
    }

    async fn fetch(
        &self,
        day: NaiveDate,
        next_day: NaiveDate,
        options: &FetchOptions,
    ) -> Result<Vec<CandidatePaper>> {
        // submittedDate takes YYYYMMDDHHMM bounds; the range operator's
        // upper bound is exclusive, matching the next_day contract.
        let query = format!(
            "submittedDate:[{}0000 TO {}0000]",
            compact_date(day),
            compact_date(next_day),
        );

        // arXiv caps max_results at 2000 per request
        let per_page = options.per_page.min(2000);
        let mut papers = Vec::new();

        for page in 0..options.max_pages {
            let start = (page * per_page).to_string();
            let max_results = per_page.to_string();

            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("search_query", query.as_str()),
                    ("sortBy", "submittedDate"),
                    ("sortOrder", "descending"),
                    ("start", start.as_str()),
                    ("max_results", max_results.as_str()),
                ])
                .send()
                .await
                .context("arXiv API request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("arXiv API returned {status}: {body}");
            }

            let body = response
                .text()
                .await
                .context("Failed to read arXiv response body")?;

            let page_papers = parse_atom(&body)?;
            let page_count = page_papers.len();
            papers.extend(page_papers);

            debug!(page = page, page_count = page_count, "Fetched arXiv page");

            // A short page means the feed is exhausted
            if page_count < per_page {
                break;
            }
        }

        Ok(papers)
    }
}

fn compact_date(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Parse an arXiv Atom feed into candidate papers.
///
/// Collects title, summary (abstract), id (the stable abs URL), published
/// timestamp, author names, and category terms. Title and summary are
/// whitespace-collapsed — arXiv wraps them with hard line breaks.
pub fn parse_atom(xml: &str) -> Result<Vec<CandidatePaper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();

    let mut in_entry = false;
    let mut in_author = false;
    let mut current_tag: Vec<u8> = Vec::new();

    let mut title = String::new();
    let mut summary = String::new();
    let mut id = String::new();
    let mut published = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut categories: Vec<String> = Vec::new();

    loop {
        match reader.read_event().context("Malformed arXiv Atom feed")? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"entry" => {
                        in_entry = true;
                        title.clear();
                        summary.clear();
                        id.clear();
                        published.clear();
                        authors.clear();
                        categories.clear();
                    }
                    b"author" if in_entry => in_author = true,
                    _ => {}
                }
                current_tag = name;
            }
            Event::Empty(e) => {
                if in_entry && e.name().as_ref() == b"category" {
                    if let Some(attr) = e
                        .try_get_attribute("term")
                        .context("Malformed arXiv category element")?
                    {
                        let term = attr
                            .unescape_value()
                            .context("Malformed arXiv category term")?;
                        categories.push(term.into_owned());
                    }
                }
            }
            Event::Text(t) => {
                if !in_entry {
                    continue;
                }
                let text = t.unescape().context("Malformed arXiv text node")?;
                match current_tag.as_slice() {
                    b"title" => title.push_str(&text),
                    b"summary" => summary.push_str(&text),
                    b"id" => id.push_str(&text),
                    b"published" => published.push_str(&text),
                    b"name" if in_author => authors.push(text.trim().to_string()),
                    _ => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"entry" => {
                    in_entry = false;
                    papers.push(build_paper(
                        &title,
                        &summary,
                        &id,
                        &published,
                        &authors,
                        &categories,
                    ));
                }
                b"author" => in_author = false,
                _ => {
                    current_tag.clear();
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

fn build_paper(
    title: &str,
    summary: &str,
    id: &str,
    published: &str,
    authors: &[String],
    categories: &[String],
) -> CandidatePaper {
    let mut paper = CandidatePaper::new(collapse_whitespace(title), collapse_whitespace(summary));

    paper
        .extra
        .insert("source".to_string(), Value::String("arXiv".to_string()));
    if !id.is_empty() {
        paper
            .extra
            .insert("url".to_string(), Value::String(id.trim().to_string()));
    }
    if !published.is_empty() {
        paper.extra.insert(
            "published".to_string(),
            Value::String(published.trim().to_string()),
        );
    }
    if !authors.is_empty() {
        paper.extra.insert(
            "authors".to_string(),
            Value::Array(authors.iter().cloned().map(Value::String).collect()),
        );
    }
    if !categories.is_empty() {
        paper.extra.insert(
            "categories".to_string(),
            Value::Array(categories.iter().cloned().map(Value::String).collect()),
        );
    }

    paper
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
