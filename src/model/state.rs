use serde::{Deserialize, Serialize};

use super::list::{ItemList, ListKind};

/// Which family of lists the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveType {
    #[default]
    Default,
    Custom,
    /// The read-only combined view across every list
    All,
}

impl ActiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveType::Default => "default",
            ActiveType::Custom => "custom",
            ActiveType::All => "all",
        }
    }

    pub fn parse_active_type(s: &str) -> Option<ActiveType> {
        match s {
            "default" => Some(ActiveType::Default),
            "custom" => Some(ActiveType::Custom),
            "all" => Some(ActiveType::All),
            _ => None,
        }
    }

    /// The list kind this view shows, or `None` for the combined view
    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            ActiveType::Default => Some(ListKind::Default),
            ActiveType::Custom => Some(ListKind::Custom),
            ActiveType::All => None,
        }
    }
}

/// How list display orders are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Insertion order
    Storage,
    /// Incomplete first, closest to complete first
    #[default]
    Closest,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Storage => "storage",
            SortMode::Closest => "closest",
        }
    }

    pub fn parse_sort_mode(s: &str) -> Option<SortMode> {
        match s {
            "storage" => Some(SortMode::Storage),
            "closest" => Some(SortMode::Closest),
            _ => None,
        }
    }
}

/// The whole persisted engine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub lists: Vec<ItemList>,
    pub active_type: ActiveType,
    pub selected_list_id: String,
    pub show_collected: bool,
    pub favorited: bool,
    #[serde(default)]
    pub sort_mode: SortMode,
}

impl Default for TrackerState {
    fn default() -> Self {
        TrackerState {
            lists: Vec::new(),
            active_type: ActiveType::Default,
            selected_list_id: String::new(),
            show_collected: true,
            favorited: false,
            sort_mode: SortMode::Closest,
        }
    }
}

impl TrackerState {
    pub fn find_list(&self, list_id: &str) -> Option<&ItemList> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn find_list_mut(&mut self, list_id: &str) -> Option<&mut ItemList> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    /// True while the combined view is active; item mutations are refused
    pub fn is_read_only(&self) -> bool {
        self.active_type == ActiveType::All
    }

    pub fn lists_of_kind(&self, kind: ListKind) -> impl Iterator<Item = &ItemList> {
        self.lists.iter().filter(move |l| l.kind == kind)
    }

    /// The currently selected list, if it exists
    pub fn selected_list(&self) -> Option<&ItemList> {
        self.find_list(&self.selected_list_id)
    }

    /// Point the selection at a list that exists, preferring the active
    /// type's first list when the current selection is gone.
    pub fn repair_selection(&mut self) {
        if self.find_list(&self.selected_list_id).is_some() {
            return;
        }
        let fallback = self
            .active_type
            .list_kind()
            .and_then(|kind| self.lists_of_kind(kind).next())
            .or_else(|| self.lists.first())
            .map(|l| l.id.clone())
            .unwrap_or_default();
        self.selected_list_id = fallback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str, kind: ListKind) -> ItemList {
        ItemList::new(id, id, kind, None, vec![])
    }

    #[test]
    fn default_state_shows_collected() {
        let state = TrackerState::default();
        assert!(state.show_collected);
        assert!(!state.favorited);
        assert_eq!(state.sort_mode, SortMode::Closest);
    }

    #[test]
    fn repair_selection_prefers_active_kind() {
        let mut state = TrackerState {
            lists: vec![list("d1", ListKind::Default), list("c1", ListKind::Custom)],
            active_type: ActiveType::Custom,
            selected_list_id: "gone".into(),
            ..Default::default()
        };
        state.repair_selection();
        assert_eq!(state.selected_list_id, "c1");
    }

    #[test]
    fn repair_selection_keeps_valid_choice() {
        let mut state = TrackerState {
            lists: vec![list("d1", ListKind::Default), list("d2", ListKind::Default)],
            selected_list_id: "d2".into(),
            ..Default::default()
        };
        state.repair_selection();
        assert_eq!(state.selected_list_id, "d2");
    }

    #[test]
    fn sort_mode_defaults_when_missing() {
        let json = r#"{"lists":[],"activeType":"all","selectedListId":"","showCollected":false,"favorited":true}"#;
        let state: TrackerState = serde_json::from_str(json).unwrap();
        assert_eq!(state.active_type, ActiveType::All);
        assert_eq!(state.sort_mode, SortMode::Closest);
        assert!(state.is_read_only());
    }
}
