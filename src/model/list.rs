use serde::{Deserialize, Serialize};

use super::item::Item;

/// Label substituted whenever a list would otherwise have no subcategories
pub const DEFAULT_SUBCATEGORY: &str = "General";

/// Whether a list was seeded at startup or created by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Default,
    Custom,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Default => "default",
            ListKind::Custom => "custom",
        }
    }
}

/// A named collection of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ListKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub subcategory_order: Vec<String>,
    /// Items in insertion order, unique by id
    pub items: Vec<Item>,
}

impl ItemList {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ListKind,
        category: Option<String>,
        subcategories: Vec<String>,
    ) -> Self {
        let mut list = ItemList {
            id: id.into(),
            name: name.into(),
            kind,
            category,
            subcategory_order: subcategories,
            items: Vec::new(),
        };
        list.normalize();
        list
    }

    pub fn is_default(&self) -> bool {
        self.kind == ListKind::Default
    }

    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.find_item(item_id).is_some()
    }

    pub fn has_subcategory(&self, label: &str) -> bool {
        self.subcategory_order.iter().any(|l| l == label)
    }

    /// The first label in the order. The order is never empty once normalized.
    pub fn first_subcategory(&self) -> &str {
        self.subcategory_order
            .first()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SUBCATEGORY)
    }

    /// Repair the order and every item's label set so that the subcategory
    /// invariants hold, and re-clamp every item.
    pub fn normalize(&mut self) {
        self.subcategory_order = normalize_labels(std::mem::take(&mut self.subcategory_order));
        for i in 0..self.items.len() {
            let labels = std::mem::take(&mut self.items[i].subcategories);
            let fixed = self.fit_item_labels(labels);
            let item = &mut self.items[i];
            item.subcategories = fixed;
            item.clamp();
        }
    }

    /// Restrict `labels` to this list's order (deduplicated, original order
    /// kept), falling back to the first label when nothing survives. Default
    /// lists keep a single label per item.
    pub fn fit_item_labels(&self, labels: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::new();
        for label in labels {
            if self.has_subcategory(&label) && !kept.contains(&label) {
                kept.push(label);
            }
        }
        if self.is_default() {
            kept.truncate(1);
        }
        if kept.is_empty() {
            kept.push(self.first_subcategory().to_string());
        }
        kept
    }
}

/// Trim, drop empties and duplicates; substitute the default label if
/// nothing remains.
pub fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    if out.is_empty() {
        out.push(DEFAULT_SUBCATEGORY.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_order_becomes_general() {
        let list = ItemList::new("l", "L", ListKind::Custom, None, vec![]);
        assert_eq!(list.subcategory_order, vec!["General"]);
    }

    #[test]
    fn normalize_labels_trims_and_dedupes() {
        let out = normalize_labels(labels(&[" Metal", "Metal", "", "  ", "Cores"]));
        assert_eq!(out, vec!["Metal", "Cores"]);
    }

    #[test]
    fn normalize_repairs_item_labels_and_counts() {
        let mut list = ItemList::new("l", "L", ListKind::Custom, None, labels(&["Metal", "Cores"]));
        let mut item = Item::new("a", "A", 2).with_subcategories(&["Tech", "Cores", "Cores"]);
        item.have = 7;
        list.items.push(item);
        list.items.push(Item::new("b", "B", 1));

        list.normalize();

        assert_eq!(list.items[0].subcategories, vec!["Cores"]);
        assert_eq!(list.items[0].have, 2);
        assert_eq!(list.items[1].subcategories, vec!["Metal"]);
    }

    #[test]
    fn default_lists_keep_one_label_per_item() {
        let list = ItemList::new("d", "D", ListKind::Default, None, labels(&["Metal", "Cores"]));
        let fitted = list.fit_item_labels(labels(&["Cores", "Metal"]));
        assert_eq!(fitted, vec!["Cores"]);
    }

    #[test]
    fn list_kind_serializes_lowercase_under_type() {
        let list = ItemList::new("d", "D", ListKind::Default, None, vec![]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["type"], "default");
        assert_eq!(json["subcategoryOrder"][0], "General");
        assert!(json.get("category").is_none());
    }
}
