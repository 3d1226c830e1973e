// Zotero Web API client — authenticated item listing.
//
// A thin reqwest wrapper over the user-items endpoint. Only reads the
// library; the API key goes in the Zotero-API-Key header. Credentials are
// injected at construction — nothing here touches the environment.
//
// API docs: https://www.zotero.org/support/dev/web_api/v3/basics

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Default Zotero API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.zotero.org";

/// Items per page — the Zotero API caps limit at 100.
const PAGE_LIMIT: usize = 100;

/// Client for the Zotero user-items endpoint.
pub struct ZoteroClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    api_key: String,
}

/// One library item. Attachments and notes have no `data` worth reading,
/// so the field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoteroItem {
    pub data: Option<ZoteroItemData>,
}

/// The metadata subfields the profile builder cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoteroItemData {
    pub title: Option<String>,
    #[serde(rename = "abstractNote")]
    pub abstract_note: Option<String>,
}

impl ZoteroClient {
    /// Create a client for one user's library.
    pub fn new(base_url: &str, user: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("paperlens/0.1 (daily paper recommendations)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch library items, most recently modified first.
    ///
    /// Pages with a `start` offset until a short page or `max_items`.
    pub async fn fetch_items(&self, max_items: usize) -> Result<Vec<ZoteroItem>> {
        let url = format!("{}/users/{}/items", self.base_url, self.user);
        let mut items: Vec<ZoteroItem> = Vec::new();

        loop {
            let limit = PAGE_LIMIT.min(max_items - items.len()).to_string();
            let start = items.len().to_string();

            let response = self
                .client
                .get(&url)
                .header("Zotero-API-Key", &self.api_key)
                .query(&[
                    ("format", "json"),
                    ("limit", limit.as_str()),
                    ("start", start.as_str()),
                    ("sort", "dateModified"),
                    ("direction", "desc"),
                ])
                .send()
                .await
                .context("Zotero API request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Zotero API returned {status}: {body}");
            }

            let page: Vec<ZoteroItem> = response
                .json()
                .await
                .context("Failed to parse Zotero response")?;

            let page_count = page.len();
            items.extend(page);

            debug!(
                page_count = page_count,
                total_collected = items.len(),
                "Fetched page of Zotero items"
            );

            if page_count < PAGE_LIMIT || items.len() >= max_items {
                break;
            }
        }

        info!(count = items.len(), "Collected Zotero library items");
        Ok(items)
    }
}
