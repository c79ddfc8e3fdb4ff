use feedsieve_client::{RequestDescriptor, Transport};
use feedsieve_core::config::ApiConfig;
use feedsieve_core::Group;
use std::sync::Arc;
use tracing::{error, info};

use crate::members::RelationResponse;

/// Lists the logged-in user's follow groups, the source of the tab bar.
pub struct GroupDirectory {
    transport: Arc<dyn Transport>,
    tags_url: String,
}

impl GroupDirectory {
    pub fn new(transport: Arc<dyn Transport>, api: &ApiConfig) -> Self {
        Self {
            transport,
            tags_url: api.tags_url.clone(),
        }
    }

    /// Empty on any failure; the caller just shows no group tabs.
    pub async fn list_groups(&self) -> Vec<Group> {
        let response = match self.transport.send(RequestDescriptor::get(self.tags_url.as_str())).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Failed to fetch follow groups");
                return Vec::new();
            }
        };

        if !response.is_ok() {
            error!(status = %response.status(), "Follow groups request rejected");
            return Vec::new();
        }

        match response.json::<RelationResponse<Vec<Group>>>() {
            Ok(body) if body.code == 0 => {
                let groups = body.data.unwrap_or_default();
                info!(count = groups.len(), "Loaded follow groups");
                groups
            }
            Ok(body) => {
                error!(code = body.code, message = %body.message, "Follow groups API returned error code");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Failed to parse follow groups response");
                Vec::new()
            }
        }
    }
}
