use feedsieve_client::{RequestDescriptor, SessionIdentity, Transport};
use feedsieve_core::config::{ApiConfig, MembersConfig};
use feedsieve_core::{GroupId, Identity, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::state::{lock_state, SharedFilterState};

/// `{ code, message, data }` wrapper used by the relation endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct RelationResponse<T> {
    pub(crate) code: i64,
    #[serde(default)]
    pub(crate) message: String,
    pub(crate) data: Option<T>,
}

/// Why a member walk stopped. Only used for logging; every variant still
/// yields whatever was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    LastPage,
    EmptyPage,
    HttpStatus,
    ApiCode,
    Transport,
    Parse,
}

/// Resolves a follow group into its member ids by walking the paginated
/// relation endpoint one page at a time.
pub struct MembershipResolver {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionIdentity>,
    state: SharedFilterState,
    members_url: String,
    page_size: u32,
    page_delay: Duration,
}

impl MembershipResolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionIdentity>,
        state: SharedFilterState,
        api: &ApiConfig,
        members: &MembersConfig,
    ) -> Self {
        Self {
            transport,
            session,
            state,
            members_url: api.tag_members_url.clone(),
            page_size: members.page_size.max(1),
            page_delay: Duration::from_millis(members.page_delay_ms),
        }
    }

    /// Logged-in user, read from the session once and cached in the filter state.
    pub fn current_user(&self) -> Option<Identity> {
        let mut state = lock_state(&self.state);
        if let Some(user) = state.current_user() {
            return Some(user.clone());
        }
        let user = self.session.current_identity()?;
        state.cache_current_user(user.clone());
        Some(user)
    }

    /// All member ids of `group`, in the order the API returns them, without
    /// duplicates. Failures part-way through return the pages fetched so far.
    pub async fn resolve_members(&self, group: GroupId) -> Vec<Identity> {
        let Some(user) = self.current_user() else {
            warn!(group = %group, "No logged-in user in session, cannot resolve group members");
            return Vec::new();
        };

        let mut members = Vec::new();
        let mut seen = HashSet::new();
        let mut page: u32 = 1;

        let reason = loop {
            let entries = match self.fetch_page(&user, group, page).await {
                Ok(entries) => entries,
                Err(reason) => break reason,
            };
            if entries.is_empty() {
                break StopReason::EmptyPage;
            }

            let fetched = entries.len();
            for entry in &entries {
                match entry.get("mid").and_then(Identity::from_json) {
                    Some(id) => {
                        if seen.insert(id.clone()) {
                            members.push(id);
                        }
                    }
                    None => debug!(group = %group, page, "Member entry without mid, skipped"),
                }
            }

            if fetched < self.page_size as usize {
                break StopReason::LastPage;
            }
            page += 1;
            tokio::time::sleep(self.page_delay).await;
        };

        match reason {
            StopReason::LastPage | StopReason::EmptyPage => {
                info!(group = %group, members = members.len(), pages = page, "Resolved group members");
            }
            _ => {
                warn!(
                    group = %group,
                    members = members.len(),
                    page,
                    reason = ?reason,
                    "Group member walk aborted, using partial result"
                );
            }
        }
        members
    }

    async fn fetch_page(&self, user: &Identity, group: GroupId, page: u32) -> std::result::Result<Vec<Value>, StopReason> {
        let url = self.page_url(user, group, page).map_err(|e| {
            warn!(error = %e, url = %self.members_url, "Invalid group members URL");
            StopReason::Parse
        })?;

        let response = self
            .transport
            .send(RequestDescriptor::get(url))
            .await
            .map_err(|e| {
                warn!(error = %e, group = %group, page, "Group members request failed");
                StopReason::Transport
            })?;

        if !response.is_ok() {
            warn!(status = %response.status(), group = %group, page, "Group members request rejected");
            return Err(StopReason::HttpStatus);
        }

        let body: RelationResponse<Vec<Value>> = response.json().map_err(|e| {
            warn!(error = %e, group = %group, page, "Failed to parse group members response");
            StopReason::Parse
        })?;

        if body.code != 0 {
            warn!(code = body.code, message = %body.message, group = %group, page, "Group members API returned error code");
            return Err(StopReason::ApiCode);
        }

        Ok(body.data.unwrap_or_default())
    }

    fn page_url(&self, user: &Identity, group: GroupId, page: u32) -> Result<String> {
        let url = Url::parse_with_params(
            &self.members_url,
            &[
                ("mid", user.to_string()),
                ("tagid", group.to_string()),
                ("pn", page.to_string()),
                ("ps", self.page_size.to_string()),
            ],
        )?;
        Ok(url.into())
    }
}
