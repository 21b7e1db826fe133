use serde::Deserialize;

use crate::model::item::{Item, Rarity};

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no items found in import file")]
    NoItems,
}

/// One entry of an import file. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ImportEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image: String,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    have: u32,
    #[serde(default = "default_need")]
    need: u32,
    #[serde(default)]
    subcategories: Vec<String>,
    #[serde(default)]
    subcategory: Option<String>,
}

fn default_need() -> u32 {
    1
}

/// Parse an import file: a JSON array of item objects, or an object with an
/// `items` array. Entries without an ID are skipped; a missing name falls
/// back to the ID and an unknown rarity to Common.
pub fn parse_import(text: &str) -> Result<Vec<Item>, ImportError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Document {
        Bare(Vec<ImportEntry>),
        Wrapped { items: Vec<ImportEntry> },
    }

    let entries = match serde_json::from_str::<Document>(text)? {
        Document::Bare(entries) | Document::Wrapped { items: entries } => entries,
    };

    let items: Vec<Item> = entries
        .into_iter()
        .filter(|e| !e.id.trim().is_empty())
        .map(|e| {
            let id = e.id.trim().to_string();
            let name = e
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| id.clone());
            let mut subcategories = e.subcategories;
            subcategories.extend(e.subcategory);
            let mut item = Item::new(id, name, e.need);
            item.image = e.image;
            item.rarity = e
                .rarity
                .as_deref()
                .and_then(Rarity::parse_rarity)
                .unwrap_or_default();
            item.have = e.have;
            item.subcategories = subcategories;
            item.clamp();
            item
        })
        .collect();

    if items.is_empty() {
        return Err(ImportError::NoItems);
    }
    Ok(items)
}
