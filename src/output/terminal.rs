// Colored terminal output for ranked recommendations.
//
// This module handles all terminal-specific formatting. The main.rs
// display logic delegates here.

use colored::Colorize;

use crate::aggregate::SourceFailure;
use crate::output::truncate_chars;
use crate::ranking::RankedRecommendation;

/// Display the ranked recommendation list in the terminal.
pub fn display_recommendations(recommendations: &[RankedRecommendation]) {
    if recommendations.is_empty() {
        println!("No candidate papers matched. Try another day or add sources.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Recommendations ({}) ===", recommendations.len()).bold()
    );
    println!();

    println!(
        "  {:>4}  {:>6}  {:<9}  {}",
        "Rank".dimmed(),
        "Sim".dimmed(),
        "Source".dimmed(),
        "Title".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for (i, rec) in recommendations.iter().enumerate() {
        let source = rec.paper.extra_str("source").unwrap_or("?");
        println!(
            "  {:>4}. {:>6.3}  {:<9}  {}",
            i + 1,
            rec.similarity,
            source,
            truncate_chars(&rec.paper.title, 58),
        );
        if let Some(url) = rec.paper.extra_str("url") {
            println!("        {}", url.dimmed());
        }
    }

    println!();
}

/// Report sources that failed during aggregation.
pub fn display_source_failures(failures: &[SourceFailure]) {
    for failure in failures {
        println!(
            "  {} {} unavailable: {}",
            "Warning:".yellow(),
            failure.source,
            failure.error,
        );
    }
}
