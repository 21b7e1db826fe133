use crate::model::item::Item;
use crate::model::list::ItemList;

/// Error type for have/need mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("item not found: {0}")]
    ItemNotFound(String),
}

fn item_mut<'a>(list: &'a mut ItemList, item_id: &str) -> Result<&'a mut Item, LedgerError> {
    list.find_item_mut(item_id)
        .ok_or_else(|| LedgerError::ItemNotFound(item_id.to_string()))
}

/// Set `have` directly; values above `need` clamp to `need`.
pub fn set_have(list: &mut ItemList, item_id: &str, value: u32) -> Result<(), LedgerError> {
    let item = item_mut(list, item_id)?;
    item.have = value;
    item.clamp();
    Ok(())
}

/// Set the target quantity. Shrinking `need` below `have` pulls `have` down.
pub fn set_need(list: &mut ItemList, item_id: &str, value: u32) -> Result<(), LedgerError> {
    let item = item_mut(list, item_id)?;
    item.need = value;
    item.clamp();
    Ok(())
}

/// Stepper `+`: saturates at `need`
pub fn increment(list: &mut ItemList, item_id: &str, step: u32) -> Result<(), LedgerError> {
    let item = item_mut(list, item_id)?;
    item.have = item.have.saturating_add(step);
    item.clamp();
    Ok(())
}

/// Stepper `-`: saturates at zero
pub fn decrement(list: &mut ItemList, item_id: &str, step: u32) -> Result<(), LedgerError> {
    let item = item_mut(list, item_id)?;
    item.have = item.have.saturating_sub(step);
    item.clamp();
    Ok(())
}

/// Mark an item fully collected (`have = need`)
pub fn collect(list: &mut ItemList, item_id: &str) -> Result<(), LedgerError> {
    let item = item_mut(list, item_id)?;
    item.have = item.need;
    Ok(())
}

/// Reset an item's progress (`have = 0`)
pub fn clear(list: &mut ItemList, item_id: &str) -> Result<(), LedgerError> {
    let item = item_mut(list, item_id)?;
    item.have = 0;
    Ok(())
}
