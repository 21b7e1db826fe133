use crate::model::config::SeedList;
use crate::model::item::Item;
use crate::model::list::{ItemList, ListKind, normalize_labels};
use crate::model::state::{ActiveType, TrackerState};

/// Error type for list operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("list not found: {0}")]
    NotFound(String),
    #[error("list name is empty")]
    EmptyName,
    #[error("default list cannot be changed: {0}")]
    DefaultList(String),
    #[error("no new items to add to {0}")]
    NothingToAdd(String),
}

/// Create a custom list and select it. Returns the new list's ID.
pub fn create_list(
    state: &mut TrackerState,
    name: &str,
    category: Option<&str>,
    subcategories: &[String],
) -> Result<String, ListError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListError::EmptyName);
    }
    let existing: Vec<&str> = state.lists.iter().map(|l| l.id.as_str()).collect();
    let id = generate_list_id(name, &existing);
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    state.lists.push(ItemList::new(
        id.clone(),
        name,
        ListKind::Custom,
        category,
        normalize_labels(subcategories.to_vec()),
    ));
    state.selected_list_id = id.clone();
    if state.active_type == ActiveType::Default {
        state.active_type = ActiveType::Custom;
    }
    Ok(id)
}

/// Delete a custom list. Default lists are refused.
pub fn delete_list(state: &mut TrackerState, list_id: &str) -> Result<ItemList, ListError> {
    let pos = state
        .lists
        .iter()
        .position(|l| l.id == list_id)
        .ok_or_else(|| ListError::NotFound(list_id.to_string()))?;
    if state.lists[pos].is_default() {
        return Err(ListError::DefaultList(list_id.to_string()));
    }
    let removed = state.lists.remove(pos);
    state.repair_selection();
    Ok(removed)
}

/// Rename a custom list. Seeded names are fixed.
pub fn rename_list(state: &mut TrackerState, list_id: &str, name: &str) -> Result<(), ListError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListError::EmptyName);
    }
    let list = state
        .find_list_mut(list_id)
        .ok_or_else(|| ListError::NotFound(list_id.to_string()))?;
    if list.is_default() {
        return Err(ListError::DefaultList(list_id.to_string()));
    }
    list.name = name.to_string();
    Ok(())
}

/// Add a batch of items. Items whose ID already exists in the list, or
/// earlier in the same batch, are dropped. Returns how many were added.
pub fn add_items(list: &mut ItemList, items: &[Item]) -> Result<usize, ListError> {
    let mut added = 0;
    for item in items {
        if item.id.trim().is_empty() || list.contains_item(&item.id) {
            continue;
        }
        let mut item = item.clone();
        if item.name.trim().is_empty() {
            item.name = item.id.clone();
        }
        item.subcategories = list.fit_item_labels(std::mem::take(&mut item.subcategories));
        item.clamp();
        list.items.push(item);
        added += 1;
    }
    if added == 0 {
        return Err(ListError::NothingToAdd(list.id.clone()));
    }
    Ok(added)
}

/// Add any seeded default list that is missing from the state. Existing
/// lists with a seed's ID are left untouched. Returns the number added.
pub fn seed_default_lists(state: &mut TrackerState, seeds: &[SeedList]) -> usize {
    let mut added = 0;
    for seed in seeds {
        if seed.id.trim().is_empty() || seed.name.trim().is_empty() {
            continue;
        }
        if state.find_list(&seed.id).is_some() {
            continue;
        }
        state.lists.push(seed.to_list());
        added += 1;
    }
    state.repair_selection();
    added
}

/// Disambiguate a list name by appending ` (n)` with the smallest unused
/// `n >= 2`. Returns `base` unchanged when it is free.
pub fn unique_list_name(existing: &[&str], base: &str) -> String {
    let base = base.trim();
    if !existing.contains(&base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} ({})", base, n);
        if !existing.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Build a deterministic ID for a custom list: `custom-<slug>`, with a
/// numeric suffix when it collides.
pub fn generate_list_id(name: &str, existing: &[&str]) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("list");
    }

    let base = format!("custom-{}", slug);
    if !existing.contains(&base.as_str()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !existing.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}
