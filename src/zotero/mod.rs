// Zotero integration — the reference library that defines the profile.

pub mod client;
pub mod profile;
