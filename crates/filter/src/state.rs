use feedsieve_core::Identity;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Filter mode state shared by the dispatch facade, the interception engine
/// and the group controller.
///
/// Invariant: `is_filtering` implies `target_ids` is non-empty. The only way
/// to turn filtering on is `set_targets`, which refuses an empty set.
#[derive(Debug, Default)]
pub struct FilterState {
    is_filtering: bool,
    target_ids: Arc<HashSet<Identity>>,
    current_user: Option<Identity>,
    empty_streak: u32,
}

pub type SharedFilterState = Arc<Mutex<FilterState>>;

pub fn shared_state() -> SharedFilterState {
    Arc::new(Mutex::new(FilterState::default()))
}

/// Lock the state, recovering from poisoning. Every critical section is a
/// handful of field writes, so a panicking holder cannot leave it half-updated
/// in a way later readers would care about.
pub fn lock_state(state: &SharedFilterState) -> MutexGuard<'_, FilterState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FilterState {
    pub fn is_filtering(&self) -> bool {
        self.is_filtering
    }

    /// Snapshot of the current targets; cheap to take and safe to hold across awaits.
    pub fn target_ids(&self) -> Arc<HashSet<Identity>> {
        Arc::clone(&self.target_ids)
    }

    pub fn current_user(&self) -> Option<&Identity> {
        self.current_user.as_ref()
    }

    pub fn cache_current_user(&mut self, id: Identity) {
        self.current_user = Some(id);
    }

    pub fn empty_streak(&self) -> u32 {
        self.empty_streak
    }

    /// Switch filtering on for `ids`. An empty set clears filtering instead.
    /// Returns whether filtering ended up active.
    pub fn set_targets(&mut self, ids: impl IntoIterator<Item = Identity>) -> bool {
        let ids: HashSet<Identity> = ids.into_iter().collect();
        if ids.is_empty() {
            self.clear();
            return false;
        }
        self.target_ids = Arc::new(ids);
        self.is_filtering = true;
        self.empty_streak = 0;
        true
    }

    /// Back to unfiltered mode. Leaves the cached user id alone.
    pub fn clear(&mut self) {
        self.is_filtering = false;
        self.target_ids = Arc::new(HashSet::new());
        self.empty_streak = 0;
    }

    pub fn reset_streak(&mut self) {
        self.empty_streak = 0;
    }

    /// Record one exhausted load that found nothing; returns the new streak.
    pub fn record_empty(&mut self) -> u32 {
        self.empty_streak = self.empty_streak.saturating_add(1);
        self.empty_streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<Identity> {
        raw.iter().filter_map(|s| Identity::new(*s)).collect()
    }

    #[test]
    fn test_default_is_unfiltered() {
        let state = FilterState::default();
        assert!(!state.is_filtering());
        assert!(state.target_ids().is_empty());
        assert!(state.current_user().is_none());
        assert_eq!(state.empty_streak(), 0);
    }

    #[test]
    fn test_set_targets_enables_and_resets_streak() {
        let mut state = FilterState::default();
        state.record_empty();
        state.record_empty();
        assert!(state.set_targets(ids(&["1", "2", "2"])));
        assert!(state.is_filtering());
        assert_eq!(state.target_ids().len(), 2);
        assert_eq!(state.empty_streak(), 0);
    }

    #[test]
    fn test_empty_targets_never_enable_filtering() {
        let mut state = FilterState::default();
        state.set_targets(ids(&["1"]));
        assert!(!state.set_targets(Vec::new()));
        assert!(!state.is_filtering());
        assert!(state.target_ids().is_empty());
    }

    #[test]
    fn test_clear_keeps_cached_user() {
        let mut state = FilterState::default();
        state.cache_current_user(Identity::new("99").unwrap());
        state.set_targets(ids(&["1"]));
        state.record_empty();
        state.clear();
        assert!(!state.is_filtering());
        assert!(state.target_ids().is_empty());
        assert_eq!(state.empty_streak(), 0);
        assert_eq!(state.current_user().map(|u| u.as_str()), Some("99"));
    }

    #[test]
    fn test_snapshot_survives_later_updates() {
        let mut state = FilterState::default();
        state.set_targets(ids(&["1"]));
        let snapshot = state.target_ids();
        state.set_targets(ids(&["2", "3"]));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(state.target_ids().len(), 2);
    }
}
