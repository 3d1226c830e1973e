use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use paperlens::config::Config;
use paperlens::output::{terminal, truncate_chars};
use paperlens::pipeline::Pipeline;
use paperlens::zotero::client::ZoteroClient;
use paperlens::zotero::profile;

/// PaperLens: daily research-paper recommendations.
///
/// Builds an interest profile from your Zotero library, fetches papers
/// published on a target day, and mails you the closest matches.
#[derive(Parser)]
#[command(name = "paperlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and mail the report
    Run {
        /// Target publication day, YYYY-MM-DD (default: today)
        #[arg(long)]
        day: Option<String>,
    },

    /// Run the pipeline without mailing; print and save the report
    Preview {
        /// Target publication day, YYYY-MM-DD (default: today)
        #[arg(long)]
        day: Option<String>,

        /// Where to write the Markdown report
        #[arg(long)]
        out: Option<String>,
    },

    /// Fetch the Zotero library and show the interest profile
    Profile,

    /// Download the ONNX embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("paperlens=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { day } => {
            let config = Config::load()?;
            config.require_zotero()?;
            config.require_model()?;
            config.require_mail()?;

            let day = parse_day(day.as_deref())?;
            println!("Running daily recommendations for {day}...");

            let pipeline = Pipeline::new(config)?;
            let summary = pipeline.run(day).await?;

            println!("\n{}", "Run complete.".bold());
            print_summary(&summary);
            println!("  Report mailed.");
        }

        Commands::Preview { day, out } => {
            let config = Config::load()?;
            config.require_zotero()?;
            config.require_model()?;

            let day = parse_day(day.as_deref())?;
            println!("Building recommendations for {day} (no mail)...");

            let pipeline = Pipeline::new(config)?;
            let report = pipeline.build_report(day).await?;

            terminal::display_source_failures(&report.failures);
            terminal::display_recommendations(&report.recommendations);
            print_summary(&report.summary);

            let path = out.unwrap_or_else(|| format!("output/paperlens-{day}.md"));
            if let Some(parent) = std::path::Path::new(&path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
            std::fs::write(&path, &report.markdown)
                .with_context(|| format!("Failed to write {path}"))?;
            println!("\n{}", format!("Markdown report saved to: {path}").bold());
        }

        Commands::Profile => {
            let config = Config::load()?;
            config.require_zotero()?;

            println!("Fetching your Zotero library...");

            let client = ZoteroClient::new(
                &config.zotero_api_url,
                &config.zotero_user,
                &config.zotero_key,
            )?;
            let items = client.fetch_items(10_000).await?;
            let texts = profile::persona_texts(&items);

            println!(
                "\n{}",
                format!(
                    "=== Interest Profile ({} of {} items usable) ===",
                    texts.len(),
                    items.len()
                )
                .bold()
            );
            for text in texts.iter().take(10) {
                // First line of each block is "## Paper N"; second is the title
                if let Some(title_line) = text.lines().nth(1) {
                    println!("  {}", truncate_chars(title_line.trim_start_matches("- "), 76));
                }
            }
            if texts.len() > 10 {
                println!("  {}", format!("... and {} more", texts.len() - 10).dimmed());
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading embedding model...");
            println!("  Destination: {}", model_dir.display());

            paperlens::embedding::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `paperlens preview` or `paperlens run`.");
        }
    }

    Ok(())
}

/// Parse a --day argument, defaulting to today's local date.
fn parse_day(day: Option<&str>) -> Result<NaiveDate> {
    match day {
        Some(s) => {
            let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid --day '{s}', expected YYYY-MM-DD"))?;
            Ok(parsed)
        }
        None => {
            let today = Local::now().date_naive();
            info!(day = %today, "No --day given, using today");
            Ok(today)
        }
    }
}

fn print_summary(summary: &paperlens::pipeline::RunSummary) {
    println!("  Profile papers:     {}", summary.profile_texts);
    println!("  Candidates fetched: {}", summary.candidates_fetched);
    println!("  Candidates kept:    {}", summary.candidates_kept);
    println!("  Recommended:        {}", summary.recommended);
    if !summary.failed_sources.is_empty() {
        println!(
            "  {} {}",
            "Failed sources:".yellow(),
            summary.failed_sources.join(", ")
        );
    }
}
