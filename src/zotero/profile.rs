// Profile building — turn library items into persona texts.
//
// Every item that carries both a title and an abstract contributes one
// numbered text block. The blocks are what gets embedded and averaged
// into the persona vector.

use tracing::debug;

use super::client::ZoteroItem;
use crate::persona::paper_block;

/// Extract persona texts from library items, preserving item order.
///
/// Items without a `data` field, or missing either title or abstractNote,
/// are skipped. Numbering is 1-based over the kept items.
pub fn persona_texts(items: &[ZoteroItem]) -> Vec<String> {
    let mut texts = Vec::new();

    for item in items {
        let Some(data) = &item.data else { continue };
        let (Some(title), Some(abstract_note)) = (&data.title, &data.abstract_note) else {
            continue;
        };

        texts.push(paper_block(texts.len() + 1, title, abstract_note));
        debug!(index = texts.len(), title = %title, "Loaded paper from Zotero");
    }

    texts
}
