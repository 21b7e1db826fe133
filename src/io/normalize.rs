use serde_json::{Map, Value};

use crate::model::item::{Item, Rarity};
use crate::model::list::{ItemList, ListKind, normalize_labels};
use crate::model::state::{ActiveType, SortMode, TrackerState};

/// Result of a lenient load. Anything structurally wrong is dropped or
/// defaulted instead of failing the load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub state: TrackerState,
    /// Human-readable description of every repair, in encounter order
    pub repairs: Vec<String>,
    /// Raw JSON of entries that were dropped outright
    pub dropped: Vec<Value>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Parse a state document. Never fails: unparseable text yields the
/// default state.
pub fn parse_state(text: &str) -> LoadReport {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => normalize_state(&value),
        Err(e) => LoadReport {
            repairs: vec![format!("state is not valid JSON ({}); starting empty", e)],
            ..Default::default()
        },
    }
}

/// Normalize an already-parsed document
pub fn normalize_state(value: &Value) -> LoadReport {
    let mut report = LoadReport::default();
    let Some(root) = value.as_object() else {
        report
            .repairs
            .push("state root is not an object; starting empty".to_string());
        return report;
    };

    let mut lists: Vec<ItemList> = Vec::new();
    match root.get("lists") {
        Some(Value::Array(raw_lists)) => {
            for raw in raw_lists {
                match normalize_list(raw, &mut report) {
                    Some(list) if lists.iter().any(|l| l.id == list.id) => {
                        report.repairs.push(format!("dropped duplicate list {}", list.id));
                        report.dropped.push(raw.clone());
                    }
                    Some(list) => lists.push(list),
                    None => report.dropped.push(raw.clone()),
                }
            }
        }
        Some(_) => report.repairs.push("lists is not an array".to_string()),
        None => {}
    }

    let state = &mut report.state;
    state.lists = lists;
    state.active_type = str_field(root, "activeType")
        .and_then(ActiveType::parse_active_type)
        .unwrap_or_default();
    state.selected_list_id = str_field(root, "selectedListId")
        .unwrap_or_default()
        .to_string();
    state.show_collected = root
        .get("showCollected")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    state.favorited = root
        .get("favorited")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    state.sort_mode = str_field(root, "sortMode")
        .and_then(SortMode::parse_sort_mode)
        .unwrap_or_default();

    let selected = state.selected_list_id.clone();
    state.repair_selection();
    if !selected.is_empty() && state.selected_list_id != selected {
        report
            .repairs
            .push(format!("selected list {} no longer exists", selected));
    }
    report
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// A non-blank string field, returned untrimmed
fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    str_field(obj, key).filter(|s| !s.trim().is_empty())
}

fn normalize_list(raw: &Value, report: &mut LoadReport) -> Option<ItemList> {
    let Some(obj) = raw.as_object() else {
        report.repairs.push("dropped list that is not an object".to_string());
        return None;
    };
    let Some(id) = required_str(obj, "id") else {
        report.repairs.push("dropped list without an id".to_string());
        return None;
    };
    let Some(name) = required_str(obj, "name") else {
        report.repairs.push(format!("dropped list {} without a name", id));
        return None;
    };

    let kind = match str_field(obj, "type") {
        Some("default") => ListKind::Default,
        Some("custom") => ListKind::Custom,
        _ => {
            report
                .repairs
                .push(format!("list {} has no valid type; treating as custom", id));
            ListKind::Custom
        }
    };
    let category = str_field(obj, "category")
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string);

    let raw_order: Vec<String> = match obj.get("subcategoryOrder") {
        Some(Value::Array(labels)) => labels
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    let order = normalize_labels(raw_order.clone());
    if order != raw_order {
        report
            .repairs
            .push(format!("list {} subcategories repaired", id));
    }

    let mut list = ItemList::new(id, name.trim(), kind, category, order);

    match obj.get("items") {
        Some(Value::Array(raw_items)) => {
            for raw_item in raw_items {
                match normalize_item(raw_item, &list, report) {
                    Some(item) if list.contains_item(&item.id) => {
                        report
                            .repairs
                            .push(format!("list {}: dropped duplicate item {}", id, item.id));
                        report.dropped.push(raw_item.clone());
                    }
                    Some(item) => list.items.push(item),
                    None => report.dropped.push(raw_item.clone()),
                }
            }
        }
        Some(_) => report
            .repairs
            .push(format!("list {}: items is not an array", id)),
        None => {}
    }
    Some(list)
}

fn normalize_item(raw: &Value, list: &ItemList, report: &mut LoadReport) -> Option<Item> {
    let Some(obj) = raw.as_object() else {
        report
            .repairs
            .push(format!("list {}: dropped item that is not an object", list.id));
        return None;
    };
    let Some(id) = required_str(obj, "id") else {
        report
            .repairs
            .push(format!("list {}: dropped item without an id", list.id));
        return None;
    };
    let name = match required_str(obj, "name") {
        Some(name) => name,
        None => {
            report
                .repairs
                .push(format!("list {}: item {} had no name; using its id", list.id, id));
            id
        }
    };

    let raw_labels: Vec<String> = match obj.get("subcategories") {
        Some(Value::Array(labels)) => labels
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    let labels = list.fit_item_labels(raw_labels.clone());
    if labels != raw_labels {
        report
            .repairs
            .push(format!("list {}: item {} subcategories repaired", list.id, id));
    }

    let need = count_field(obj, "need");
    let have = count_field(obj, "have");
    if have > need {
        report
            .repairs
            .push(format!("list {}: item {} had more than needed", list.id, id));
    }

    let mut item = Item {
        id: id.to_string(),
        name: name.to_string(),
        image: str_field(obj, "image").unwrap_or_default().to_string(),
        rarity: str_field(obj, "rarity")
            .and_then(Rarity::parse_rarity)
            .unwrap_or_default(),
        have,
        need,
        subcategories: labels,
    };
    item.clamp();
    Some(item)
}

/// Read a non-negative count. Negatives become 0, fractions round down,
/// anything else is 0.
fn count_field(obj: &Map<String, Value>, key: &str) -> u32 {
    let Some(value) = obj.get(key) else {
        return 0;
    };
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => {
            if f >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                f.floor() as u32
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::builtin_seeds;
    use crate::ops::list_ops::seed_default_lists;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn garbage_yields_default_state() {
        for text in ["", "not json {{{", "[1,2,3]", "null", "42"] {
            let report = parse_state(text);
            assert_eq!(report.state, TrackerState::default(), "input: {:?}", text);
            assert!(!report.is_clean());
        }
    }

    #[test]
    fn well_formed_state_round_trips_cleanly() {
        let mut state = TrackerState::default();
        seed_default_lists(&mut state, &builtin_seeds());
        state.lists[0].items[0].have = 7;
        state.favorited = true;
        state.sort_mode = SortMode::Storage;

        let text = serde_json::to_string_pretty(&state).unwrap();
        let report = parse_state(&text);
        assert_eq!(report.state, state);
        assert!(report.is_clean(), "repairs: {:?}", report.repairs);
    }

    #[test]
    fn missing_subcategory_order_becomes_general() {
        let report = normalize_state(&json!({
            "lists": [{
                "id": "l", "name": "L", "type": "custom",
                "items": [{ "id": "a", "name": "A", "have": 1, "need": 2 }]
            }]
        }));
        let list = &report.state.lists[0];
        assert_eq!(list.subcategory_order, vec!["General"]);
        assert_eq!(list.items[0].subcategories, vec!["General"]);
    }

    #[test]
    fn items_missing_subcategories_get_first_label() {
        let report = normalize_state(&json!({
            "lists": [{
                "id": "l", "name": "L", "type": "custom",
                "subcategoryOrder": ["Metal", "Cores"],
                "items": [
                    { "id": "a", "name": "A", "have": 0, "need": 2 },
                    { "id": "b", "name": "B", "have": 0, "need": 2, "subcategories": ["Gone"] }
                ]
            }]
        }));
        let list = &report.state.lists[0];
        assert_eq!(list.items[0].subcategories, vec!["Metal"]);
        assert_eq!(list.items[1].subcategories, vec!["Metal"]);
    }

    #[test]
    fn invalid_entries_are_dropped() {
        let report = normalize_state(&json!({
            "lists": [
                "nope",
                { "name": "No id" },
                { "id": "blank", "name": "   " },
                { "id": "ok", "name": " Ok ", "type": "default",
                  "subcategoryOrder": ["A"],
                  "items": [
                      7,
                      { "id": "x" },
                      { "id": "y", "name": "Y", "need": 3, "have": 1 },
                      { "id": "y", "name": "Y twice", "need": 9 }
                  ] },
                { "id": "ok", "name": "Duplicate list" }
            ],
            "selectedListId": "ok"
        }));
        assert_eq!(report.state.lists.len(), 1);
        let list = &report.state.lists[0];
        assert_eq!(list.name, "Ok");
        assert_eq!(list.kind, ListKind::Default);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].name, "x");
        assert_eq!(list.items[1].name, "Y");
        assert_eq!(report.dropped.len(), 6);
        assert_eq!(report.state.selected_list_id, "ok");
    }

    #[test]
    fn counts_are_coerced_and_clamped() {
        let report = normalize_state(&json!({
            "lists": [{
                "id": "l", "name": "L", "type": "custom", "subcategoryOrder": ["A"],
                "items": [
                    { "id": "neg", "name": "N", "have": -4, "need": -1 },
                    { "id": "frac", "name": "F", "have": 2.9, "need": 5.5 },
                    { "id": "over", "name": "O", "have": 10, "need": 3 },
                    { "id": "str", "name": "S", "have": "3", "need": true },
                    { "id": "big", "name": "B", "have": 1, "need": 1e12 }
                ]
            }]
        }));
        let counts: Vec<(u32, u32)> = report.state.lists[0]
            .items
            .iter()
            .map(|i| (i.have, i.need))
            .collect();
        assert_eq!(
            counts,
            vec![(0, 0), (2, 5), (3, 3), (0, 0), (1, u32::MAX)]
        );
    }

    #[test]
    fn scalar_fields_default_when_wrong_type() {
        let report = normalize_state(&json!({
            "lists": [],
            "activeType": "everything",
            "selectedListId": 5,
            "showCollected": "yes",
            "favorited": null,
            "sortMode": 1
        }));
        assert_eq!(report.state, TrackerState::default());
    }

    #[test]
    fn unknown_rarity_and_type_default() {
        let report = normalize_state(&json!({
            "lists": [{
                "id": "l", "name": "L", "type": "shared", "subcategoryOrder": ["A"],
                "items": [{ "id": "a", "name": "A", "rarity": "Mythic", "need": 1, "subcategories": ["A"] }]
            }]
        }));
        let list = &report.state.lists[0];
        assert_eq!(list.kind, ListKind::Custom);
        assert_eq!(list.items[0].rarity, Rarity::Common);
        assert_eq!(list.items[0].image, "");
    }

    #[test]
    fn stale_selection_falls_back() {
        let report = normalize_state(&json!({
            "lists": [{ "id": "l", "name": "L", "type": "custom", "subcategoryOrder": ["A"], "items": [] }],
            "activeType": "custom",
            "selectedListId": "deleted"
        }));
        assert_eq!(report.state.selected_list_id, "l");
        assert!(!report.is_clean());
    }
}
