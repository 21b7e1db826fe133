use crate::model::list::ItemList;

/// Error type for subcategory edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubcategoryError {
    #[error("subcategory label is empty")]
    EmptyLabel,
    #[error("subcategory already exists: {0}")]
    Duplicate(String),
    #[error("subcategory not found: {0}")]
    UnknownLabel(String),
    #[error("cannot remove the last subcategory of a list")]
    LastLabel,
    #[error("new order is not a permutation of the current subcategories")]
    NotAPermutation,
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("item {0} must keep at least one subcategory")]
    LastItemLabel(String),
}

/// Append a new label to the list's order. Labels are trimmed and compared
/// case-sensitively.
pub fn add_subcategory(list: &mut ItemList, label: &str) -> Result<(), SubcategoryError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(SubcategoryError::EmptyLabel);
    }
    if list.has_subcategory(label) {
        return Err(SubcategoryError::Duplicate(label.to_string()));
    }
    list.subcategory_order.push(label.to_string());
    Ok(())
}

/// Remove a label. Items left without any label move to the new first label.
pub fn remove_subcategory(list: &mut ItemList, label: &str) -> Result<(), SubcategoryError> {
    let pos = list
        .subcategory_order
        .iter()
        .position(|l| l == label)
        .ok_or_else(|| SubcategoryError::UnknownLabel(label.to_string()))?;
    if list.subcategory_order.len() == 1 {
        return Err(SubcategoryError::LastLabel);
    }
    list.subcategory_order.remove(pos);

    let first = list.first_subcategory().to_string();
    for item in &mut list.items {
        item.subcategories.retain(|l| l != label);
        if item.subcategories.is_empty() {
            item.subcategories.push(first.clone());
        }
    }
    Ok(())
}

/// Replace the order with a permutation of itself
pub fn reorder_subcategories(
    list: &mut ItemList,
    new_order: &[String],
) -> Result<(), SubcategoryError> {
    if new_order.len() != list.subcategory_order.len() {
        return Err(SubcategoryError::NotAPermutation);
    }
    let mut current: Vec<&str> = list.subcategory_order.iter().map(|s| s.as_str()).collect();
    let mut proposed: Vec<&str> = new_order.iter().map(|s| s.as_str()).collect();
    current.sort_unstable();
    proposed.sort_unstable();
    if current != proposed {
        return Err(SubcategoryError::NotAPermutation);
    }

    list.subcategory_order = new_order.to_vec();
    let order = list.subcategory_order.clone();
    for item in &mut list.items {
        sort_by_order(&mut item.subcategories, &order);
    }
    Ok(())
}

/// Flip an item's membership in a label. Default lists hold exactly one
/// label per item, so selecting a label there replaces the current one.
pub fn toggle_item_subcategory(
    list: &mut ItemList,
    item_id: &str,
    label: &str,
) -> Result<(), SubcategoryError> {
    if !list.has_subcategory(label) {
        return Err(SubcategoryError::UnknownLabel(label.to_string()));
    }
    let single = list.is_default();
    let order = list.subcategory_order.clone();
    let item = list
        .find_item_mut(item_id)
        .ok_or_else(|| SubcategoryError::ItemNotFound(item_id.to_string()))?;

    if single {
        item.subcategories = vec![label.to_string()];
        return Ok(());
    }

    if let Some(pos) = item.subcategories.iter().position(|l| l == label) {
        if item.subcategories.len() == 1 {
            return Err(SubcategoryError::LastItemLabel(item_id.to_string()));
        }
        item.subcategories.remove(pos);
    } else {
        item.subcategories.push(label.to_string());
        sort_by_order(&mut item.subcategories, &order);
    }
    Ok(())
}

fn sort_by_order(labels: &mut [String], order: &[String]) {
    labels.sort_by_key(|l| order.iter().position(|o| o == l).unwrap_or(usize::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::Item;
    use crate::model::list::ListKind;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn custom_list() -> ItemList {
        let mut list = ItemList::new(
            "bench",
            "Bench",
            ListKind::Custom,
            None,
            labels(&["Tech", "Metal", "Cores"]),
        );
        list.items
            .push(Item::new("chip", "Chip", 3).with_subcategories(&["Tech"]));
        list.items
            .push(Item::new("gear", "Gear", 3).with_subcategories(&["Tech", "Metal"]));
        list
    }

    #[test]
    fn add_rejects_empty_and_duplicate() {
        let mut list = custom_list();
        assert_eq!(add_subcategory(&mut list, "   "), Err(SubcategoryError::EmptyLabel));
        assert_eq!(
            add_subcategory(&mut list, "Metal"),
            Err(SubcategoryError::Duplicate("Metal".into()))
        );
        add_subcategory(&mut list, "metal").unwrap();
        assert_eq!(list.subcategory_order, labels(&["Tech", "Metal", "Cores", "metal"]));
    }

    #[test]
    fn removing_only_label_relabels_to_new_first() {
        let mut list = custom_list();
        remove_subcategory(&mut list, "Tech").unwrap();
        assert_eq!(list.subcategory_order, labels(&["Metal", "Cores"]));
        assert_eq!(list.find_item("chip").unwrap().subcategories, labels(&["Metal"]));
        assert_eq!(list.find_item("gear").unwrap().subcategories, labels(&["Metal"]));
    }

    #[test]
    fn cannot_remove_last_label() {
        let mut list = ItemList::new("l", "L", ListKind::Custom, None, vec![]);
        assert_eq!(
            remove_subcategory(&mut list, "General"),
            Err(SubcategoryError::LastLabel)
        );
        assert_eq!(
            remove_subcategory(&mut list, "Other"),
            Err(SubcategoryError::UnknownLabel("Other".into()))
        );
    }

    #[test]
    fn reorder_requires_permutation() {
        let mut list = custom_list();
        assert_eq!(
            reorder_subcategories(&mut list, &labels(&["Tech", "Metal"])),
            Err(SubcategoryError::NotAPermutation)
        );
        assert_eq!(
            reorder_subcategories(&mut list, &labels(&["Tech", "Metal", "Metal"])),
            Err(SubcategoryError::NotAPermutation)
        );
        reorder_subcategories(&mut list, &labels(&["Cores", "Metal", "Tech"])).unwrap();
        assert_eq!(list.subcategory_order, labels(&["Cores", "Metal", "Tech"]));
        assert_eq!(list.find_item("gear").unwrap().subcategories, labels(&["Metal", "Tech"]));
    }

    #[test]
    fn toggle_on_custom_list_adds_and_removes() {
        let mut list = custom_list();
        toggle_item_subcategory(&mut list, "chip", "Cores").unwrap();
        assert_eq!(list.find_item("chip").unwrap().subcategories, labels(&["Tech", "Cores"]));
        toggle_item_subcategory(&mut list, "chip", "Tech").unwrap();
        assert_eq!(list.find_item("chip").unwrap().subcategories, labels(&["Cores"]));
        assert_eq!(
            toggle_item_subcategory(&mut list, "chip", "Cores"),
            Err(SubcategoryError::LastItemLabel("chip".into()))
        );
    }

    #[test]
    fn toggle_on_default_list_replaces() {
        let mut list = ItemList::new(
            "seeded",
            "Seeded",
            ListKind::Default,
            None,
            labels(&["Metal", "Cores"]),
        );
        list.items
            .push(Item::new("cell", "Cell", 2).with_subcategories(&["Metal"]));
        toggle_item_subcategory(&mut list, "cell", "Cores").unwrap();
        assert_eq!(list.find_item("cell").unwrap().subcategories, labels(&["Cores"]));
    }

    #[test]
    fn toggle_unknown_label_or_item() {
        let mut list = custom_list();
        assert_eq!(
            toggle_item_subcategory(&mut list, "chip", "Nope"),
            Err(SubcategoryError::UnknownLabel("Nope".into()))
        );
        assert_eq!(
            toggle_item_subcategory(&mut list, "ghost", "Tech"),
            Err(SubcategoryError::ItemNotFound("ghost".into()))
        );
    }
}
