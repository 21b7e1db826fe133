pub mod clock;
pub mod notify;
pub mod scheduler;

use std::collections::HashMap;
use std::time::Duration;

use crate::io::state_io::StateStore;
use crate::model::config::TallyConfig;
use crate::model::item::Item;
use crate::model::state::TrackerState;
use crate::ops::aggregate::aggregate;
use crate::ops::list_ops::seed_default_lists;
use crate::ops::reducer::{Action, ActionError, ResortTrigger, reduce};
use crate::ops::sort::{compute_order, sort_items};

use clock::Clock;
use notify::Notifier;
use scheduler::{SortPhase, SortScheduler};

/// A computed display order for one list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOrder {
    pub ids: Vec<String>,
    /// Incremented on every recompute; starts at 1
    pub generation: u64,
}

/// What happened to a dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed and was saved
    Applied,
    /// Valid, but the state was already like that
    Unchanged,
    /// Refused; state untouched
    Rejected(ActionError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Owns the state and each list's cached display order. Every mutation is an
/// [`Action`] run through the pure reducer; the tracker then decides how the
/// display order reacts and saves the result.
pub struct Tracker {
    state: TrackerState,
    orders: HashMap<String, DisplayOrder>,
    scheduler: SortScheduler,
    clock: Box<dyn Clock>,
    store: Box<dyn StateStore>,
    notifier: Box<dyn Notifier>,
    degraded: bool,
}

impl Tracker {
    /// Load state from `store` (or start empty), add missing seeded lists
    /// from `config`, and compute every list's initial order.
    pub fn open(
        config: &TallyConfig,
        store: Box<dyn StateStore>,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let (state, mut degraded) = match store.load() {
            Ok(state) => (state.unwrap_or_default(), false),
            Err(e) => {
                tracing::warn!(error = %e, "could not load state; starting in memory");
                notifier.notify("Saved data could not be loaded; changes will only last this session");
                (TrackerState::default(), true)
            }
        };

        let mut tracker = Tracker {
            state,
            orders: HashMap::new(),
            scheduler: SortScheduler::new(Duration::from_millis(config.sort.cooldown_ms)),
            clock,
            store,
            notifier,
            degraded: false,
        };

        let seeded = seed_default_lists(&mut tracker.state, &config.default_lists);
        if seeded > 0 {
            tracing::info!(count = seeded, "seeded default lists");
            if !degraded {
                tracker.persist();
                degraded = tracker.degraded;
            }
        }
        tracker.degraded = degraded;
        tracker.ensure_orders();
        tracker
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// True when the last load or save failed and changes live only in
    /// memory
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Apply an action. Elapsed cooldowns are processed first.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        self.tick();

        let next = match reduce(&self.state, &action) {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!(action = action.name(), reason = %e, "action rejected");
                return Outcome::Rejected(e);
            }
        };
        if next == self.state {
            tracing::debug!(action = action.name(), "action had no effect");
            return Outcome::Unchanged;
        }

        let previous_selection = std::mem::replace(&mut self.state, next).selected_list_id;
        self.after_commit(&action, &previous_selection);
        self.persist();
        Outcome::Applied
    }

    fn after_commit(&mut self, action: &Action, previous_selection: &str) {
        if let Action::DeleteList { list_id } = action {
            self.orders.remove(list_id);
            self.scheduler.forget(list_id);
            self.notifier.notify("List deleted");
        }
        if previous_selection != self.state.selected_list_id {
            for list_id in self.scheduler.cancel_except(&self.state.selected_list_id) {
                tracing::debug!(list = %list_id, "list switch discarded pending re-sort");
            }
        }

        match (action.resort_trigger(), action.target_list()) {
            (ResortTrigger::Deferred, Some(list_id)) => {
                let deadline = self.scheduler.continuous_edit(list_id, self.clock.now_ms());
                tracing::debug!(list = list_id, deadline, "re-sort deferred");
            }
            (ResortTrigger::Immediate, Some(list_id)) => {
                self.scheduler.discrete_action(list_id);
                self.recompute(list_id);
                self.scheduler.finish(list_id);
            }
            (ResortTrigger::AllLists, _) => {
                self.scheduler.cancel_all();
                let ids: Vec<String> = self.state.lists.iter().map(|l| l.id.clone()).collect();
                for id in ids {
                    self.scheduler.discrete_action(&id);
                    self.recompute(&id);
                    self.scheduler.finish(&id);
                }
            }
            _ => {}
        }

        match action {
            Action::CreateList { .. } => self.notifier.notify("List created"),
            Action::RenameList { .. } => self.notifier.notify("List renamed"),
            Action::AddItems { .. } => self.notifier.notify("Items added"),
            _ => {}
        }
        self.ensure_orders();
    }

    /// Re-sort every list whose cooldown has elapsed. Returns their IDs.
    /// Nothing is saved: only display orders change.
    pub fn tick(&mut self) -> Vec<String> {
        let due = self.scheduler.take_due(self.clock.now_ms());
        for list_id in &due {
            self.recompute(list_id);
            self.scheduler.finish(list_id);
            tracing::debug!(list = %list_id, "cooldown elapsed; list re-sorted");
        }
        due
    }

    /// Drop a pending re-sort without applying it
    pub fn cancel_pending(&mut self, list_id: &str) -> bool {
        self.scheduler.cancel(list_id)
    }

    pub fn sort_phase(&self, list_id: &str) -> SortPhase {
        self.scheduler.phase(list_id)
    }

    /// Time left before a pending re-sort, for display
    pub fn cooldown_remaining(&self, list_id: &str) -> Option<Duration> {
        self.scheduler.remaining(list_id, self.clock.now_ms())
    }

    pub fn display_order(&self, list_id: &str) -> Option<&DisplayOrder> {
        self.orders.get(list_id)
    }

    /// A list's items in display order, hiding complete items unless
    /// `showCollected` is on
    pub fn visible_items(&self, list_id: &str) -> Vec<&Item> {
        let Some(list) = self.state.find_list(list_id) else {
            return Vec::new();
        };
        let mut out: Vec<&Item> = Vec::with_capacity(list.items.len());
        if let Some(order) = self.orders.get(list_id) {
            out.extend(order.ids.iter().filter_map(|id| list.find_item(id)));
        }
        for item in &list.items {
            if !out.iter().any(|i| i.id == item.id) {
                out.push(item);
            }
        }
        if !self.state.show_collected {
            out.retain(|i| !i.is_complete());
        }
        out
    }

    /// Visible items grouped under the list's subcategory order. An item
    /// appears under each of its labels; empty groups are left out.
    pub fn grouped_items(&self, list_id: &str) -> Vec<(String, Vec<&Item>)> {
        let Some(list) = self.state.find_list(list_id) else {
            return Vec::new();
        };
        let items = self.visible_items(list_id);
        list.subcategory_order
            .iter()
            .filter_map(|label| {
                let group: Vec<&Item> = items
                    .iter()
                    .copied()
                    .filter(|i| i.subcategories.contains(label))
                    .collect();
                (!group.is_empty()).then(|| (label.clone(), group))
            })
            .collect()
    }

    /// The combined view across all lists, sorted under the current sort
    /// mode. It is never edited, so it is never debounced.
    pub fn combined_view(&self) -> Vec<Item> {
        let mut items = aggregate(&self.state.lists);
        sort_items(&mut items, self.state.sort_mode);
        if !self.state.show_collected {
            items.retain(|i| !i.is_complete());
        }
        items
    }

    fn recompute(&mut self, list_id: &str) {
        let Some(list) = self.state.find_list(list_id) else {
            return;
        };
        let ids = compute_order(&list.items, self.state.sort_mode);
        let generation = self.orders.get(list_id).map_or(1, |o| o.generation + 1);
        self.orders
            .insert(list_id.to_string(), DisplayOrder { ids, generation });
    }

    /// Give every list without a cached order its first one
    fn ensure_orders(&mut self) {
        let missing: Vec<String> = self
            .state
            .lists
            .iter()
            .filter(|l| !self.orders.contains_key(&l.id))
            .map(|l| l.id.clone())
            .collect();
        for id in missing {
            self.recompute(&id);
        }
    }

    fn persist(&mut self) {
        match self.store.save(&self.state) {
            Ok(()) => {
                if self.degraded {
                    tracing::info!("state saved again after earlier failure");
                }
                self.degraded = false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed; keeping changes in memory");
                if !self.degraded {
                    self.notifier
                        .notify("Changes could not be saved and will only last this session");
                }
                self.degraded = true;
            }
        }
    }
}
