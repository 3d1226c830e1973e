use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::sources::FetchOptions;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file is
/// loaded automatically at startup via dotenvy. Components receive this
/// struct explicitly — nothing reads the environment after load().
pub struct Config {
    /// Zotero numeric user id (ZOTERO_USER)
    pub zotero_user: String,
    /// Zotero API key (ZOTERO_KEY)
    pub zotero_key: String,
    /// Zotero API endpoint (defaults to https://api.zotero.org)
    pub zotero_api_url: String,
    /// Directory containing the ONNX embedding model files
    pub model_dir: PathBuf,
    /// How many recommendations to include in the report
    pub top_k: usize,
    /// SMTP relay host (EMAIL_SERVER)
    pub mail_server: String,
    /// SMTP relay port (EMAIL_PORT, default 25)
    pub mail_port: u16,
    pub mail_from: String,
    pub mail_to: String,
    /// Per-source fetch overrides keyed by source name (e.g. "OpenAlex").
    /// Passed through to the fetchers without validation.
    pub source_options: HashMap<String, FetchOptions>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only defaults are filled in here — nothing is validated. Call the
    /// require_* helpers before operations that need specific settings.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("PAPERLENS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::embedding::download::default_model_dir());

        let top_k = env::var("PAPERLENS_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let mail_port = env::var("EMAIL_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(25);

        Ok(Self {
            zotero_user: env::var("ZOTERO_USER").unwrap_or_default(),
            zotero_key: env::var("ZOTERO_KEY").unwrap_or_default(),
            zotero_api_url: env::var("ZOTERO_API_URL")
                .unwrap_or_else(|_| crate::zotero::client::DEFAULT_API_URL.to_string()),
            model_dir,
            top_k,
            mail_server: env::var("EMAIL_SERVER").unwrap_or_default(),
            mail_port,
            mail_from: env::var("EMAIL_FROM").unwrap_or_default(),
            mail_to: env::var("EMAIL_TO").unwrap_or_default(),
            source_options: load_source_options(),
        })
    }

    /// Check that the Zotero credentials are configured.
    /// Call this before any operation that builds the interest profile.
    pub fn require_zotero(&self) -> Result<()> {
        if self.zotero_user.is_empty() || self.zotero_key.is_empty() {
            anyhow::bail!(
                "ZOTERO_USER / ZOTERO_KEY not set. Add them to your .env file\n\
                 (your numeric user id and an API key from zotero.org/settings/keys)."
            );
        }
        Ok(())
    }

    /// Check that mail delivery is configured.
    /// Call this before a full run — the run's purpose is unmet without delivery.
    pub fn require_mail(&self) -> Result<()> {
        if self.mail_server.is_empty() || self.mail_from.is_empty() || self.mail_to.is_empty() {
            anyhow::bail!(
                "EMAIL_SERVER / EMAIL_FROM / EMAIL_TO not set. Add them to your .env file.\n\
                 Use `paperlens preview` to run without mail delivery."
            );
        }
        Ok(())
    }

    /// Check that the embedding model files are on disk.
    pub fn require_model(&self) -> Result<()> {
        if !crate::embedding::download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `paperlens download-model` to download them.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

/// Build the per-source fetch options map.
///
/// OpenAlex defaults to 200 results per page across up to 6 pages — its
/// daily volume dwarfs the other sources. Every source accepts
/// PAPERLENS_{SOURCE}_PER_PAGE / PAPERLENS_{SOURCE}_MAX_PAGES overrides.
fn load_source_options() -> HashMap<String, FetchOptions> {
    let mut options: HashMap<String, FetchOptions> = HashMap::new();
    options.insert(
        "OpenAlex".to_string(),
        FetchOptions {
            per_page: 200,
            max_pages: 6,
        },
    );

    for (name, key) in [
        ("arXiv", "ARXIV"),
        ("Crossref", "CROSSREF"),
        ("OpenAlex", "OPENALEX"),
    ] {
        let entry = options.entry(name.to_string()).or_default();
        if let Some(per_page) = parse_env(&format!("PAPERLENS_{key}_PER_PAGE")) {
            entry.per_page = per_page;
        }
        if let Some(max_pages) = parse_env(&format!("PAPERLENS_{key}_MAX_PAGES")) {
            entry.max_pages = max_pages;
        }
    }

    options
}

fn parse_env(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
