use indexmap::IndexMap;

use crate::model::item::Item;
use crate::model::list::ItemList;

/// Merge items sharing an ID across every list into a combined entry.
///
/// `have` and `need` are summed independently; the result is not clamped
/// against any single list. Output follows first-encounter order, and a
/// merged entry keeps the name, image and rarity of its first occurrence.
pub fn aggregate(lists: &[ItemList]) -> Vec<Item> {
    let mut merged: IndexMap<&str, Item> = IndexMap::new();
    for list in lists {
        for item in &list.items {
            match merged.get_mut(item.id.as_str()) {
                Some(entry) => {
                    entry.have = entry.have.saturating_add(item.have);
                    entry.need = entry.need.saturating_add(item.need);
                    for label in &item.subcategories {
                        if !entry.subcategories.contains(label) {
                            entry.subcategories.push(label.clone());
                        }
                    }
                }
                None => {
                    merged.insert(item.id.as_str(), item.clone());
                }
            }
        }
    }
    merged.into_values().collect()
}

/// IDs of the lists that contribute to a combined entry
pub fn owning_lists<'a>(lists: &'a [ItemList], item_id: &str) -> Vec<&'a str> {
    lists
        .iter()
        .filter(|l| l.contains_item(item_id))
        .map(|l| l.id.as_str())
        .collect()
}
