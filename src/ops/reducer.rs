use crate::model::item::Item;
use crate::model::list::{ItemList, ListKind};
use crate::model::state::{ActiveType, SortMode, TrackerState};
use crate::ops::ledger::{self, LedgerError};
use crate::ops::list_ops::{self, ListError};
use crate::ops::subcategory::{self, SubcategoryError};

/// Every state transition the engine accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetHave { list_id: String, item_id: String, value: u32 },
    SetNeed { list_id: String, item_id: String, value: u32 },
    Increment { list_id: String, item_id: String, step: u32 },
    Decrement { list_id: String, item_id: String, step: u32 },
    Collect { list_id: String, item_id: String },
    Clear { list_id: String, item_id: String },
    AddSubcategory { list_id: String, label: String },
    RemoveSubcategory { list_id: String, label: String },
    ReorderSubcategories { list_id: String, order: Vec<String> },
    ToggleItemSubcategory { list_id: String, item_id: String, label: String },
    CreateList { name: String, category: Option<String>, subcategories: Vec<String> },
    DeleteList { list_id: String },
    RenameList { list_id: String, name: String },
    AddItems { list_id: String, items: Vec<Item> },
    SetActiveType(ActiveType),
    SelectList { list_id: String },
    SetShowCollected(bool),
    SetFavorited(bool),
    SetSortMode(SortMode),
}

/// How an action affects the cached display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResortTrigger {
    /// Order is unaffected
    None,
    /// Continuous edit: re-sort after the cooldown
    Deferred,
    /// Discrete action: re-sort the target list now
    Immediate,
    /// Re-sort every list now
    AllLists,
}

impl Action {
    pub fn resort_trigger(&self) -> ResortTrigger {
        match self {
            Action::SetHave { .. } | Action::Increment { .. } | Action::Decrement { .. } => {
                ResortTrigger::Deferred
            }
            Action::SetNeed { .. }
            | Action::Collect { .. }
            | Action::Clear { .. }
            | Action::AddSubcategory { .. }
            | Action::RemoveSubcategory { .. }
            | Action::ReorderSubcategories { .. }
            | Action::ToggleItemSubcategory { .. }
            | Action::AddItems { .. } => ResortTrigger::Immediate,
            Action::SetSortMode(_) => ResortTrigger::AllLists,
            Action::CreateList { .. }
            | Action::DeleteList { .. }
            | Action::RenameList { .. }
            | Action::SetActiveType(_)
            | Action::SelectList { .. }
            | Action::SetShowCollected(_)
            | Action::SetFavorited(_) => ResortTrigger::None,
        }
    }

    /// The list this action is aimed at, if any
    pub fn target_list(&self) -> Option<&str> {
        match self {
            Action::SetHave { list_id, .. }
            | Action::SetNeed { list_id, .. }
            | Action::Increment { list_id, .. }
            | Action::Decrement { list_id, .. }
            | Action::Collect { list_id, .. }
            | Action::Clear { list_id, .. }
            | Action::AddSubcategory { list_id, .. }
            | Action::RemoveSubcategory { list_id, .. }
            | Action::ReorderSubcategories { list_id, .. }
            | Action::ToggleItemSubcategory { list_id, .. }
            | Action::DeleteList { list_id }
            | Action::RenameList { list_id, .. }
            | Action::AddItems { list_id, .. }
            | Action::SelectList { list_id } => Some(list_id.as_str()),
            Action::CreateList { .. }
            | Action::SetActiveType(_)
            | Action::SetShowCollected(_)
            | Action::SetFavorited(_)
            | Action::SetSortMode(_) => None,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetHave { .. } => "set_have",
            Action::SetNeed { .. } => "set_need",
            Action::Increment { .. } => "increment",
            Action::Decrement { .. } => "decrement",
            Action::Collect { .. } => "collect",
            Action::Clear { .. } => "clear",
            Action::AddSubcategory { .. } => "add_subcategory",
            Action::RemoveSubcategory { .. } => "remove_subcategory",
            Action::ReorderSubcategories { .. } => "reorder_subcategories",
            Action::ToggleItemSubcategory { .. } => "toggle_item_subcategory",
            Action::CreateList { .. } => "create_list",
            Action::DeleteList { .. } => "delete_list",
            Action::RenameList { .. } => "rename_list",
            Action::AddItems { .. } => "add_items",
            Action::SetActiveType(_) => "set_active_type",
            Action::SelectList { .. } => "select_list",
            Action::SetShowCollected(_) => "set_show_collected",
            Action::SetFavorited(_) => "set_favorited",
            Action::SetSortMode(_) => "set_sort_mode",
        }
    }
}

/// Why an action had no effect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("list not found: {0}")]
    ListNotFound(String),
    #[error("the combined view is read-only")]
    ReadOnly,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Subcategory(#[from] SubcategoryError),
    #[error(transparent)]
    List(#[from] ListError),
}

/// Apply `action` to a copy of `state`. On error the caller keeps the
/// original state; nothing is partially applied.
pub fn reduce(state: &TrackerState, action: &Action) -> Result<TrackerState, ActionError> {
    let mut next = state.clone();
    apply(&mut next, action)?;
    Ok(next)
}

/// Like [`reduce`], but a rejected action yields the unchanged state
pub fn reduce_or_keep(state: &TrackerState, action: &Action) -> TrackerState {
    reduce(state, action).unwrap_or_else(|_| state.clone())
}

fn editable_list<'a>(
    state: &'a mut TrackerState,
    list_id: &str,
) -> Result<&'a mut ItemList, ActionError> {
    if state.is_read_only() {
        return Err(ActionError::ReadOnly);
    }
    state
        .find_list_mut(list_id)
        .ok_or_else(|| ActionError::ListNotFound(list_id.to_string()))
}

fn apply(state: &mut TrackerState, action: &Action) -> Result<(), ActionError> {
    match action {
        Action::SetHave { list_id, item_id, value } => {
            ledger::set_have(editable_list(state, list_id)?, item_id, *value)?;
        }
        Action::SetNeed { list_id, item_id, value } => {
            ledger::set_need(editable_list(state, list_id)?, item_id, *value)?;
        }
        Action::Increment { list_id, item_id, step } => {
            ledger::increment(editable_list(state, list_id)?, item_id, *step)?;
        }
        Action::Decrement { list_id, item_id, step } => {
            ledger::decrement(editable_list(state, list_id)?, item_id, *step)?;
        }
        Action::Collect { list_id, item_id } => {
            ledger::collect(editable_list(state, list_id)?, item_id)?;
        }
        Action::Clear { list_id, item_id } => {
            ledger::clear(editable_list(state, list_id)?, item_id)?;
        }
        Action::AddSubcategory { list_id, label } => {
            subcategory::add_subcategory(editable_list(state, list_id)?, label)?;
        }
        Action::RemoveSubcategory { list_id, label } => {
            subcategory::remove_subcategory(editable_list(state, list_id)?, label)?;
        }
        Action::ReorderSubcategories { list_id, order } => {
            subcategory::reorder_subcategories(editable_list(state, list_id)?, order)?;
        }
        Action::ToggleItemSubcategory { list_id, item_id, label } => {
            subcategory::toggle_item_subcategory(editable_list(state, list_id)?, item_id, label)?;
        }
        Action::AddItems { list_id, items } => {
            list_ops::add_items(editable_list(state, list_id)?, items)?;
        }
        Action::CreateList { name, category, subcategories } => {
            list_ops::create_list(state, name, category.as_deref(), subcategories)?;
        }
        Action::DeleteList { list_id } => {
            list_ops::delete_list(state, list_id)?;
        }
        Action::RenameList { list_id, name } => {
            list_ops::rename_list(state, list_id, name)?;
        }
        Action::SetActiveType(active) => {
            state.active_type = *active;
            if let Some(kind) = active.list_kind() {
                select_first_of_kind_if_needed(state, kind);
            }
        }
        Action::SelectList { list_id } => {
            let kind = state
                .find_list(list_id)
                .map(|l| l.kind)
                .ok_or_else(|| ActionError::ListNotFound(list_id.clone()))?;
            state.selected_list_id = list_id.clone();
            state.active_type = match kind {
                ListKind::Default => ActiveType::Default,
                ListKind::Custom => ActiveType::Custom,
            };
        }
        Action::SetShowCollected(show) => state.show_collected = *show,
        Action::SetFavorited(fav) => state.favorited = *fav,
        Action::SetSortMode(mode) => state.sort_mode = *mode,
    }
    Ok(())
}

fn select_first_of_kind_if_needed(state: &mut TrackerState, kind: ListKind) {
    let matches = state
        .selected_list()
        .is_some_and(|l| l.kind == kind);
    if matches {
        return;
    }
    let first = state.lists_of_kind(kind).next().map(|l| l.id.clone());
    if let Some(id) = first {
        state.selected_list_id = id;
    }
}
