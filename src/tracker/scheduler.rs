use std::collections::HashMap;
use std::time::Duration;

/// Per-list re-sort state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPhase {
    Idle,
    /// A continuous edit happened; re-sort once `deadline_ms` passes
    PendingCooldown { deadline_ms: u64 },
    /// A recompute has been handed out and not yet finished
    Resorting,
}

/// Debounced re-sort scheduler.
///
/// Holds at most one deadline per list. Continuous edits push the deadline
/// out to `now + cooldown`; discrete actions, cancels and list switches drop
/// it. The scheduler never computes anything itself: callers take the lists
/// that are due, recompute them, and report back with [`finish`].
///
/// [`finish`]: SortScheduler::finish
#[derive(Debug, Clone)]
pub struct SortScheduler {
    cooldown_ms: u64,
    phases: HashMap<String, SortPhase>,
}

impl SortScheduler {
    pub fn new(cooldown: Duration) -> Self {
        SortScheduler {
            cooldown_ms: u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX),
            phases: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn phase(&self, list_id: &str) -> SortPhase {
        self.phases.get(list_id).copied().unwrap_or(SortPhase::Idle)
    }

    /// Record a continuous edit. Restarts the cooldown and returns the new
    /// deadline.
    pub fn continuous_edit(&mut self, list_id: &str, now_ms: u64) -> u64 {
        let deadline_ms = now_ms.saturating_add(self.cooldown_ms);
        self.phases.insert(
            list_id.to_string(),
            SortPhase::PendingCooldown { deadline_ms },
        );
        deadline_ms
    }

    /// Record a discrete action: any pending deadline is dropped and the
    /// list moves straight to `Resorting`. Returns true if a pending timer
    /// was superseded.
    pub fn discrete_action(&mut self, list_id: &str) -> bool {
        let previous = self.phases.insert(list_id.to_string(), SortPhase::Resorting);
        matches!(previous, Some(SortPhase::PendingCooldown { .. }))
    }

    /// Drop a pending deadline without recomputing. Returns true if one was
    /// pending.
    pub fn cancel(&mut self, list_id: &str) -> bool {
        if let Some(SortPhase::PendingCooldown { .. }) = self.phases.get(list_id) {
            self.phases.remove(list_id);
            return true;
        }
        false
    }

    /// Drop every pending deadline. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let before = self.phases.len();
        self.phases
            .retain(|_, phase| !matches!(phase, SortPhase::PendingCooldown { .. }));
        before - self.phases.len()
    }

    /// Drop every pending deadline except `keep`'s. Returns the lists whose
    /// deadline was dropped, sorted.
    pub fn cancel_except(&mut self, keep: &str) -> Vec<String> {
        let mut dropped: Vec<String> = self
            .phases
            .iter()
            .filter(|(id, phase)| {
                id.as_str() != keep && matches!(phase, SortPhase::PendingCooldown { .. })
            })
            .map(|(id, _)| id.clone())
            .collect();
        dropped.sort();
        for id in &dropped {
            self.phases.remove(id);
        }
        dropped
    }

    /// Lists whose deadline has passed, in deadline order (ties by ID).
    /// Each returned list is moved to `Resorting`.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<String> {
        let mut due: Vec<(u64, String)> = self
            .phases
            .iter()
            .filter_map(|(id, phase)| match phase {
                SortPhase::PendingCooldown { deadline_ms } if *deadline_ms <= now_ms => {
                    Some((*deadline_ms, id.clone()))
                }
                _ => None,
            })
            .collect();
        due.sort();
        for (_, id) in &due {
            self.phases.insert(id.clone(), SortPhase::Resorting);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// A recompute handed out by [`discrete_action`] or [`take_due`] is done
    ///
    /// [`discrete_action`]: SortScheduler::discrete_action
    /// [`take_due`]: SortScheduler::take_due
    pub fn finish(&mut self, list_id: &str) {
        if self.phases.get(list_id) == Some(&SortPhase::Resorting) {
            self.phases.remove(list_id);
        }
    }

    /// Forget a list entirely (e.g. it was deleted)
    pub fn forget(&mut self, list_id: &str) {
        self.phases.remove(list_id);
    }

    /// Time left before a pending list is re-sorted. Read-only; for display.
    pub fn remaining(&self, list_id: &str, now_ms: u64) -> Option<Duration> {
        match self.phases.get(list_id) {
            Some(SortPhase::PendingCooldown { deadline_ms }) => {
                Some(Duration::from_millis(deadline_ms.saturating_sub(now_ms)))
            }
            _ => None,
        }
    }

    /// Earliest pending deadline across all lists
    pub fn next_deadline(&self) -> Option<u64> {
        self.phases
            .values()
            .filter_map(|phase| match phase {
                SortPhase::PendingCooldown { deadline_ms } => Some(*deadline_ms),
                _ => None,
            })
            .min()
    }

    pub fn pending_count(&self) -> usize {
        self.phases
            .values()
            .filter(|p| matches!(p, SortPhase::PendingCooldown { .. }))
            .count()
    }
}
