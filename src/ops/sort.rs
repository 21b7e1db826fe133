use std::cmp::Ordering;

use crate::model::item::Item;
use crate::model::state::SortMode;

/// Progress comparator for the "closest to complete" order.
///
/// Incomplete items come before complete ones; within each group the higher
/// `have/need` ratio comes first (`need == 0` counts as ratio 0); then name,
/// then ID. Ratios are compared by cross-multiplication so the comparison is
/// exact and total.
pub fn compare_progress(a: &Item, b: &Item) -> Ordering {
    a.is_complete()
        .cmp(&b.is_complete())
        .then_with(|| ratio(b).cmp_ratio(ratio(a)))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Clone, Copy)]
struct Ratio {
    num: u64,
    den: u64,
}

impl Ratio {
    fn cmp_ratio(self, other: Ratio) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

fn ratio(item: &Item) -> Ratio {
    if item.need == 0 {
        Ratio { num: 0, den: 1 }
    } else {
        Ratio {
            num: u64::from(item.have),
            den: u64::from(item.need),
        }
    }
}

/// Compute a display order (item IDs) for `items` under `mode`. The result
/// does not depend on any previously computed order.
pub fn compute_order(items: &[Item], mode: SortMode) -> Vec<String> {
    let mut refs: Vec<&Item> = items.iter().collect();
    if mode == SortMode::Closest {
        refs.sort_by(|a, b| compare_progress(a, b));
    }
    refs.into_iter().map(|i| i.id.clone()).collect()
}

/// Sort items in place under `mode`
pub fn sort_items(items: &mut [Item], mode: SortMode) {
    if mode == SortMode::Closest {
        items.sort_by(compare_progress);
    }
}
