// The daily recommendation pipeline.
//
// One linear run: profile → vectorize → aggregate → filter → rank →
// render → send. Every intermediate value lives only for the duration of
// the run; nothing persists between days.

use anyhow::Result;
use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::aggregate::{Aggregator, SourceFailure};
use crate::config::Config;
use crate::embedding::onnx::SentenceEmbedder;
use crate::embedding::traits::TextEmbedder;
use crate::mail::Mailer;
use crate::output::markdown;
use crate::persona;
use crate::ranking::{self, RankedRecommendation};
use crate::sources::arxiv::ArxivSource;
use crate::sources::crossref::CrossrefSource;
use crate::sources::openalex::OpenAlexSource;
use crate::sources::PaperSource;
use crate::zotero::client::ZoteroClient;
use crate::zotero::profile;

/// Upper bound on library items pulled for the profile.
const MAX_PROFILE_ITEMS: usize = 10_000;

/// Counters from one pipeline run, for display and logging.
pub struct RunSummary {
    pub profile_texts: usize,
    pub candidates_fetched: usize,
    pub candidates_kept: usize,
    pub recommended: usize,
    pub failed_sources: Vec<String>,
}

/// Everything rendered by a run, before (or instead of) delivery.
pub struct Report {
    pub markdown: String,
    pub recommendations: Vec<RankedRecommendation>,
    pub failures: Vec<SourceFailure>,
    pub summary: RunSummary,
}

/// The assembled pipeline with all its collaborators.
pub struct Pipeline {
    config: Config,
    zotero: ZoteroClient,
    embedder: Box<dyn TextEmbedder>,
    aggregator: Aggregator,
    mailer: Mailer,
}

impl Pipeline {
    /// Build the pipeline from configuration: Zotero client, local
    /// embedder, the configured sources, and the mailer.
    pub fn new(config: Config) -> Result<Self> {
        let zotero = ZoteroClient::new(
            &config.zotero_api_url,
            &config.zotero_user,
            &config.zotero_key,
        )?;
        let embedder = SentenceEmbedder::load(&config.model_dir)?;
        let aggregator = Aggregator::new(default_sources()?);
        let mailer = Mailer::new(
            &config.mail_server,
            config.mail_port,
            &config.mail_from,
            &config.mail_to,
        );

        Ok(Self {
            config,
            zotero,
            embedder: Box::new(embedder),
            aggregator,
            mailer,
        })
    }

    /// Run everything up to and including rendering — no mail.
    pub async fn build_report(&self, day: NaiveDate) -> Result<Report> {
        let next_day = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow::anyhow!("Day out of range: {day}"))?;

        info!(day = %day, "Pipeline started");

        // 1) Interest profile from the Zotero library
        info!("Fetching user profile from Zotero");
        let items = self.zotero.fetch_items(MAX_PROFILE_ITEMS).await?;
        let texts = profile::persona_texts(&items);
        if texts.is_empty() {
            warn!("Zotero library yielded no profile texts; all similarities will be 0");
        }

        // 2) Persona vector
        info!(texts = texts.len(), "Embedding profile texts");
        let persona_vec = persona::persona_vector(self.embedder.as_ref(), &texts).await?;

        // 3) Candidate papers for the day
        info!(sources = ?self.aggregator.source_names(), "Fetching candidate papers");
        let outcome = self
            .aggregator
            .fetch_all(day, next_day, &self.config.source_options)
            .await;
        let fetched = outcome.papers.len();

        // 4) Filter and rank
        let (candidates, candidate_texts) = ranking::filter_candidates(outcome.papers);
        let kept = candidates.len();
        info!(fetched = fetched, kept = kept, "Filtered candidate papers");

        let recommendations = ranking::rank(
            self.embedder.as_ref(),
            &persona_vec,
            candidates,
            &candidate_texts,
            self.config.top_k,
        )
        .await?;

        // 5) Render
        let rendered = markdown::render(day, &recommendations);

        let summary = RunSummary {
            profile_texts: texts.len(),
            candidates_fetched: fetched,
            candidates_kept: kept,
            recommended: recommendations.len(),
            failed_sources: failure_names(&outcome.failures),
        };

        Ok(Report {
            markdown: rendered,
            recommendations,
            failures: outcome.failures,
            summary,
        })
    }

    /// The full daily run: build the report and mail it.
    pub async fn run(&self, day: NaiveDate) -> Result<RunSummary> {
        let report = self.build_report(day).await?;

        info!("Rendering markdown and sending email");
        self.mailer
            .send_markdown(&format!("[PaperLens] {day}"), &report.markdown)
            .await?;

        Ok(report.summary)
    }
}

/// The default source set, in merge order.
fn default_sources() -> Result<Vec<Box<dyn PaperSource>>> {
    Ok(vec![
        Box::new(ArxivSource::new(crate::sources::arxiv::DEFAULT_API_URL)?),
        Box::new(CrossrefSource::new(crate::sources::crossref::DEFAULT_API_URL)?),
        Box::new(OpenAlexSource::new(crate::sources::openalex::DEFAULT_API_URL)?),
    ])
}

fn failure_names(failures: &[SourceFailure]) -> Vec<String> {
    failures.iter().map(|f| f.source.clone()).collect()
}
