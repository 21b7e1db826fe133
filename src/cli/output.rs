use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::item::Item;
use crate::model::list::ItemList;
use crate::model::state::{ActiveType, SortMode};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub name: String,
    pub rarity: String,
    pub have: u32,
    pub need: u32,
    pub complete: bool,
    pub subcategories: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
}

#[derive(Serialize)]
pub struct ListSummaryJson {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub items: usize,
    pub complete: usize,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct GroupJson {
    pub label: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub subcategory_order: Vec<String>,
    pub groups: Vec<GroupJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resort_pending_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct CombinedItemJson {
    #[serde(flatten)]
    pub item: ItemJson,
    pub lists: Vec<String>,
}

#[derive(Serialize)]
pub struct FindHitJson {
    pub list: String,
    pub item: String,
    pub name: String,
    pub fields: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn item_to_json(item: &Item) -> ItemJson {
    ItemJson {
        id: item.id.clone(),
        name: item.name.clone(),
        rarity: item.rarity.name().to_string(),
        have: item.have,
        need: item.need,
        complete: item.is_complete(),
        subcategories: item.subcategories.clone(),
        image: item.image.clone(),
    }
}

pub fn list_summary_to_json(list: &ItemList, selected: bool) -> ListSummaryJson {
    ListSummaryJson {
        id: list.id.clone(),
        name: list.name.clone(),
        kind: list.kind.as_str(),
        category: list.category.clone(),
        items: list.items.len(),
        complete: list.items.iter().filter(|i| i.is_complete()).count(),
        selected,
    }
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn check_char(item: &Item) -> char {
    if item.is_complete() { 'x' } else { ' ' }
}

/// Format a single item as a one-line summary
pub fn format_item_line(item: &Item) -> String {
    format!(
        "[{}] {}/{} {} ({}) {}",
        check_char(item),
        item.have,
        item.need,
        item.name,
        item.id,
        item.rarity
    )
}

/// Format a list for the lists overview
pub fn format_list_summary(list: &ItemList, selected: bool) -> String {
    let marker = if selected { '*' } else { ' ' };
    let kind = match &list.category {
        Some(category) => format!("{}, {}", list.kind.as_str(), category),
        None => list.kind.as_str().to_string(),
    };
    let complete = list.items.iter().filter(|i| i.is_complete()).count();
    format!(
        "{} {} ({}) [{}] {}/{} complete",
        marker,
        list.name,
        list.id,
        kind,
        complete,
        list.items.len()
    )
}

/// Format a list's items under their subcategory headings
pub fn format_list_listing(list: &ItemList, groups: &[(String, Vec<&Item>)]) -> Vec<String> {
    let mut lines = vec![format!("== {} ({}) ==", list.name, list.id)];
    if groups.is_empty() {
        lines.push(String::new());
        lines.push("(no items)".to_string());
        return lines;
    }
    for (label, items) in groups {
        lines.push(String::new());
        lines.push(format!("-- {} --", label));
        lines.extend(items.iter().map(|item| format_item_line(item)));
    }
    lines
}

/// Format the combined view; each item notes which lists it comes from
pub fn format_combined(items: &[(Item, Vec<String>)]) -> Vec<String> {
    let mut lines = vec!["== All lists (read-only) ==".to_string()];
    if items.is_empty() {
        lines.push(String::new());
        lines.push("(no items)".to_string());
        return lines;
    }
    lines.push(String::new());
    for (item, lists) in items {
        lines.push(format!("{} <{}>", format_item_line(item), lists.join(", ")));
    }
    lines
}

/// Format the view settings line shown under `lists`
pub fn format_view_status(
    active: ActiveType,
    sort: SortMode,
    show_collected: bool,
    favorited: bool,
) -> String {
    format!(
        "view: {}  sort: {}  collected: {}  favorite: {}",
        active.as_str(),
        sort.as_str(),
        if show_collected { "shown" } else { "hidden" },
        if favorited { "yes" } else { "no" },
    )
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} [{}] {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    lines.extend(entry.body.lines().map(|l| format!("  {}", l)));
    lines
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

pub fn parse_on_off(s: &str) -> Result<bool, String> {
    match s {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", s)),
    }
}

pub fn parse_view(s: &str) -> Result<ActiveType, String> {
    ActiveType::parse_active_type(s)
        .ok_or_else(|| format!("unknown view '{}' (expected: default, custom, all)", s))
}

pub fn parse_sort(s: &str) -> Result<SortMode, String> {
    SortMode::parse_sort_mode(s)
        .ok_or_else(|| format!("unknown sort mode '{}' (expected: storage, closest)", s))
}
