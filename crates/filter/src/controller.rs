use feedsieve_core::{GroupId, GroupSelection};
use tracing::{info, warn};

use crate::members::MembershipResolver;
use crate::state::{lock_state, SharedFilterState};

/// What a tab click did to the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub selection: GroupSelection,
    /// Whether feed requests are now filtered.
    pub filtering: bool,
    pub members: usize,
    /// Message for the user when the selection could not be applied as asked.
    pub advisory: Option<String>,
}

/// The UI side of the filter: turns group selections into filter state.
/// After any call the host is expected to reload the feed.
pub struct FilterController {
    state: SharedFilterState,
    resolver: MembershipResolver,
}

impl FilterController {
    pub fn new(state: SharedFilterState, resolver: MembershipResolver) -> Self {
        Self { state, resolver }
    }

    pub fn state(&self) -> &SharedFilterState {
        &self.state
    }

    /// Apply a tab selection. Every selection, including picking the group
    /// that is already active, resets the empty streak.
    pub async fn select(&self, selection: GroupSelection) -> SelectionOutcome {
        match selection {
            GroupSelection::AllContent => {
                lock_state(&self.state).clear();
                info!("Filter cleared, showing all content");
                SelectionOutcome {
                    selection,
                    filtering: false,
                    members: 0,
                    advisory: None,
                }
            }
            GroupSelection::Group(group) => self.select_group(group).await,
        }
    }

    async fn select_group(&self, group: GroupId) -> SelectionOutcome {
        let members = self.resolver.resolve_members(group).await;
        let count = members.len();

        let filtering = lock_state(&self.state).set_targets(members);
        if !filtering {
            warn!(group = %group, "Group resolved to no members, filter disabled");
            return SelectionOutcome {
                selection: GroupSelection::Group(group),
                filtering: false,
                members: 0,
                advisory: Some(format!(
                    "Could not load any members for group {}; showing all content",
                    group
                )),
            };
        }

        info!(group = %group, members = count, "Filter enabled");
        SelectionOutcome {
            selection: GroupSelection::Group(group),
            filtering: true,
            members: count,
            advisory: None,
        }
    }

    /// User switched feed tabs by hand: give the breaker a fresh start.
    pub fn switch_tab(&self) {
        lock_state(&self.state).reset_streak();
    }
}
