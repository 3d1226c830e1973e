// PaperLens: daily research-paper recommendations from a Zotero library.
//
// This is the library root. Each module corresponds to one stage of the
// recommendation pipeline: profile building, embedding, candidate fetching,
// aggregation, ranking, rendering, and delivery.

pub mod aggregate;
pub mod config;
pub mod embedding;
pub mod mail;
pub mod output;
pub mod persona;
pub mod pipeline;
pub mod ranking;
pub mod sources;
pub mod zotero;
