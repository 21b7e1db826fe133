use std::ops::Range;

use regex::Regex;

use crate::model::item::Item;
use crate::model::list::ItemList;

/// Which field of an item matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Id,
    Name,
    Subcategory,
}

impl MatchField {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Id => "id",
            MatchField::Name => "name",
            MatchField::Subcategory => "subcategory",
        }
    }
}

/// A search hit on one field of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub list_id: String,
    pub item_id: String,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search item names, IDs and labels. With `list_filter` only that list is
/// searched. Each item yields at most one hit per field.
pub fn search_items(lists: &[ItemList], re: &Regex, list_filter: Option<&str>) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for list in lists {
        if list_filter.is_some_and(|f| f != list.id) {
            continue;
        }
        for item in &list.items {
            search_item(&list.id, item, re, &mut hits);
        }
    }
    hits
}

fn search_item(list_id: &str, item: &Item, re: &Regex, hits: &mut Vec<SearchHit>) {
    let mut push = |field: MatchField, spans: Vec<Range<usize>>| {
        if !spans.is_empty() {
            hits.push(SearchHit {
                list_id: list_id.to_string(),
                item_id: item.id.clone(),
                field,
                spans,
            });
        }
    };

    push(MatchField::Name, find_matches(re, &item.name));
    push(MatchField::Id, find_matches(re, &item.id));

    for label in &item.subcategories {
        let spans = find_matches(re, label);
        if !spans.is_empty() {
            push(MatchField::Subcategory, spans);
            break;
        }
    }
}

/// Distinct `(list_id, item_id)` pairs from a hit list, first-hit order
pub fn matched_items(hits: &[SearchHit]) -> Vec<(&str, &str)> {
    let mut out: Vec<(&str, &str)> = Vec::new();
    for hit in hits {
        let key = (hit.list_id.as_str(), hit.item_id.as_str());
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
