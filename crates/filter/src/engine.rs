//! Feed interception: walk the feed until a page has something from the
//! selected authors, then hand back a response that looks like the page the
//! client asked for.
//!
//! Per load the engine requests at most `max_retry_pages` pages, strictly one
//! after another (each offset comes from the previous page). A load that runs
//! out of pages or attempts without a match counts toward the empty streak;
//! once the streak reaches `max_empty_batches` the returned envelope says
//! `has_more: false`, which stops the client from scrolling further loads.

use feedsieve_client::{RequestDescriptor, ResponseLike, Transport};
use feedsieve_core::config::FilterConfig;
use feedsieve_core::{Identity, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cursor;
use crate::envelope::{author_of, FeedEnvelope, Peek};
use crate::state::{lock_state, SharedFilterState};

#[derive(Debug, Clone)]
pub struct EngineLimits {
    pub max_retry_pages: u32,
    pub max_empty_batches: u32,
    pub author_pointer: String,
}

impl From<&FilterConfig> for EngineLimits {
    fn from(cfg: &FilterConfig) -> Self {
        Self {
            max_retry_pages: cfg.max_retry_pages.max(1),
            max_empty_batches: cfg.max_empty_batches.max(1),
            author_pointer: cfg.author_pointer.clone(),
        }
    }
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

pub struct FeedInterceptor {
    raw: Arc<dyn Transport>,
    state: SharedFilterState,
    limits: EngineLimits,
}

impl FeedInterceptor {
    pub fn new(raw: Arc<dyn Transport>, state: SharedFilterState, limits: EngineLimits) -> Self {
        Self { raw, state, limits }
    }

    /// Filtered version of `request`'s response.
    ///
    /// Never fails because of the filtering itself: any internal error falls
    /// back to one plain fetch of the original request, whose result (success
    /// or transport error) is returned as-is.
    pub async fn fetch_filtered(&self, request: RequestDescriptor) -> Result<ResponseLike> {
        match self.walk(&request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(error = %e, url = %request.url, "Feed filter failed, falling back to unfiltered fetch");
                self.raw.send(request).await
            }
        }
    }

    async fn walk(&self, original: &RequestDescriptor) -> Result<ResponseLike> {
        let targets = lock_state(&self.state).target_ids();
        let mut request = original.clone();
        let mut attempt: u32 = 1;

        loop {
            let response = self.raw.send(request.clone()).await?;
            if !response.is_ok() {
                debug!(status = %response.status(), attempt, "Feed page not OK, passing through");
                return Ok(response);
            }

            let mut envelope = match FeedEnvelope::peek(&response) {
                Peek::Feed(envelope) => envelope,
                Peek::Passthrough(reason) => {
                    debug!(reason, attempt, "Feed page not understood, passing through");
                    return Ok(response);
                }
            };

            let matched = self.matching_items(envelope.items(), &targets);
            let next_offset = envelope.offset();

            if !matched.is_empty() {
                lock_state(&self.state).reset_streak();
                debug!(attempt, matched = matched.len(), total = envelope.items().len(), "Feed page matched");
                envelope.set_items(matched);
                return Ok(response.replace_body(envelope.to_bytes()?));
            }

            match next_offset {
                Some(offset) if envelope.has_more() && attempt < self.limits.max_retry_pages => {
                    debug!(attempt, offset = %offset, "No match on feed page, fetching next");
                    request = cursor::advance(&request, &offset);
                    attempt += 1;
                }
                _ => return self.exhausted(response, envelope, attempt),
            }
        }
    }

    /// Items whose author is a target, original order kept.
    fn matching_items(&self, items: &[Value], targets: &HashSet<Identity>) -> Vec<Value> {
        items
            .iter()
            .filter(|item| {
                author_of(item, &self.limits.author_pointer).map_or(false, |author| targets.contains(&author))
            })
            .cloned()
            .collect()
    }

    fn exhausted(&self, response: ResponseLike, mut envelope: FeedEnvelope, attempts: u32) -> Result<ResponseLike> {
        let streak = lock_state(&self.state).record_empty();

        // data.offset stays as the last page sent it, so the client's own
        // paging resumes after the pages already skipped here.
        envelope.set_items(Vec::new());

        let tripped = streak >= self.limits.max_empty_batches;
        if tripped {
            envelope.set_has_more(false);
        }

        info!(attempts, streak, tripped, "No matching feed items found");
        Ok(response.replace_body(envelope.to_bytes()?))
    }
}
