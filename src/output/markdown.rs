// Markdown report rendering.
//
// Produces the daily report that gets mailed out. One section per
// recommendation: title, similarity, pass-through metadata where the
// source provided it, and a truncated abstract.

use chrono::NaiveDate;
use serde_json::Value;

use crate::output::truncate_chars;
use crate::ranking::RankedRecommendation;

/// Abstracts longer than this are cut at a character boundary.
const ABSTRACT_CHARS: usize = 1200;

/// Render the ranked recommendations as a Markdown report.
pub fn render(day: NaiveDate, recommendations: &[RankedRecommendation]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# PaperLens — {day}\n\n"));

    if recommendations.is_empty() {
        md.push_str("No matching papers were published on this day.\n");
        return md;
    }

    md.push_str(&format!(
        "{} papers, ranked by similarity to your library.\n\n",
        recommendations.len()
    ));

    for (i, rec) in recommendations.iter().enumerate() {
        let title = if rec.paper.title.trim().is_empty() {
            "(untitled)"
        } else {
            rec.paper.title.trim()
        };
        md.push_str(&format!("## {}. {}\n\n", i + 1, title));
        md.push_str(&format!("- Similarity: {:.4}\n", rec.similarity));

        if let Some(source) = rec.paper.extra_str("source") {
            md.push_str(&format!("- Source: {source}\n"));
        }
        if let Some(authors) = rec.paper.extra.get("authors").and_then(Value::as_array) {
            let names: Vec<&str> = authors.iter().filter_map(Value::as_str).collect();
            if !names.is_empty() {
                md.push_str(&format!("- Authors: {}\n", names.join(", ")));
            }
        }
        if let Some(venue) = rec.paper.extra_str("venue") {
            md.push_str(&format!("- Venue: {venue}\n"));
        }
        if let Some(doi) = rec.paper.extra_str("doi") {
            md.push_str(&format!("- DOI: {doi}\n"));
        }
        if let Some(url) = rec.paper.extra_str("url") {
            md.push_str(&format!("- Link: {url}\n"));
        }

        if !rec.paper.abstract_text.trim().is_empty() {
            md.push('\n');
            md.push_str(&truncate_chars(rec.paper.abstract_text.trim(), ABSTRACT_CHARS));
            md.push('\n');
        }

        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::CandidatePaper;

    fn rec(title: &str, abstract_text: &str, similarity: f32) -> RankedRecommendation {
        RankedRecommendation {
            paper: CandidatePaper::new(title, abstract_text),
            similarity,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
    }

    #[test]
    fn report_contains_day_and_titles() {
        let md = render(day(), &[rec("Paper One", "About birds.", 0.87)]);
        assert!(md.contains("# PaperLens — 2024-01-09"));
        assert!(md.contains("## 1. Paper One"));
        assert!(md.contains("Similarity: 0.8700"));
        assert!(md.contains("About birds."));
    }

    #[test]
    fn empty_day_renders_placeholder() {
        let md = render(day(), &[]);
        assert!(md.contains("No matching papers"));
    }

    #[test]
    fn metadata_lines_appear_when_present() {
        let mut r = rec("T", "A", 0.5);
        r.paper.extra.insert(
            "url".to_string(),
            serde_json::Value::String("https://arxiv.org/abs/1".to_string()),
        );
        r.paper.extra.insert(
            "authors".to_string(),
            serde_json::Value::Array(vec![serde_json::Value::String("Ada".to_string())]),
        );
        let md = render(day(), &[r]);
        assert!(md.contains("- Link: https://arxiv.org/abs/1"));
        assert!(md.contains("- Authors: Ada"));
    }

    #[test]
    fn untitled_papers_get_a_placeholder_heading() {
        let md = render(day(), &[rec("", "Only an abstract.", 0.3)]);
        assert!(md.contains("## 1. (untitled)"));
    }
}
