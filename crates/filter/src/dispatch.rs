use async_trait::async_trait;
use feedsieve_client::{RequestDescriptor, ResponseLike, Transport};
use feedsieve_core::{Config, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::engine::{EngineLimits, FeedInterceptor};
use crate::state::{lock_state, SharedFilterState};

/// Drop-in replacement for the raw transport.
///
/// Behaves exactly like the wrapped transport unless filtering is on and the
/// request is a feed request, in which case the feed interceptor answers.
/// Intercepted loads run one at a time.
pub struct InterceptedTransport {
    raw: Arc<dyn Transport>,
    state: SharedFilterState,
    engine: FeedInterceptor,
    feed_path_fragment: String,
    load_gate: Mutex<()>,
}

impl InterceptedTransport {
    pub fn new(
        raw: Arc<dyn Transport>,
        state: SharedFilterState,
        feed_path_fragment: impl Into<String>,
        limits: EngineLimits,
    ) -> Self {
        let engine = FeedInterceptor::new(Arc::clone(&raw), state.clone(), limits);
        Self {
            raw,
            state,
            engine,
            feed_path_fragment: feed_path_fragment.into(),
            load_gate: Mutex::new(()),
        }
    }

    pub fn from_config(raw: Arc<dyn Transport>, state: SharedFilterState, config: &Config) -> Self {
        Self::new(
            raw,
            state,
            config.api.feed_path_fragment.clone(),
            EngineLimits::from(&config.filter),
        )
    }

    pub fn state(&self) -> &SharedFilterState {
        &self.state
    }

    /// `fetch(url)` or `fetch(request)`: anything that converts into a request.
    pub async fn fetch(&self, input: impl Into<RequestDescriptor>) -> Result<ResponseLike> {
        self.send(input.into()).await
    }

    fn is_feed_request(&self, url: &str) -> bool {
        !self.feed_path_fragment.is_empty() && url.contains(&self.feed_path_fragment)
    }

    fn should_intercept(&self, url: &str) -> bool {
        self.is_feed_request(url) && lock_state(&self.state).is_filtering()
    }
}

#[async_trait]
impl Transport for InterceptedTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseLike> {
        if !self.should_intercept(request.url()) {
            return self.raw.send(request).await;
        }

        let _gate = self.load_gate.lock().await;
        // Filtering may have been switched off while waiting for the gate.
        let still_filtering = lock_state(&self.state).is_filtering();
        if !still_filtering {
            return self.raw.send(request).await;
        }
        debug!(url = %request.url(), "Intercepting feed request");
        self.engine.fetch_filtered(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::shared_state;
    use crate::testing::{feed_item, feed_items, feed_page, MockTransport, FEED_URL};
    use feedsieve_core::{Error, Identity};
    use reqwest::header::{HeaderValue, COOKIE};
    use reqwest::StatusCode;

    fn facade(transport: Arc<MockTransport>) -> InterceptedTransport {
        InterceptedTransport::from_config(transport, shared_state(), &Config::default())
    }

    fn enable(facade: &InterceptedTransport, ids: &[&str]) {
        lock_state(facade.state()).set_targets(ids.iter().filter_map(|i| Identity::new(*i)));
    }

    fn mixed_page() -> ResponseLike {
        feed_page(vec![feed_item("a", 1), feed_item("b", 2)], "next", true)
    }

    #[tokio::test]
    async fn test_passthrough_when_not_filtering() {
        let transport = MockTransport::new(|_, _| Ok(mixed_page()));
        let facade = facade(transport.clone());

        let resp = facade.fetch(FEED_URL).await.unwrap();
        assert_eq!(resp, mixed_page());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_for_other_endpoints_while_filtering() {
        let transport = MockTransport::new(|_, _| Ok(mixed_page()));
        let facade = facade(transport.clone());
        enable(&facade, &["1"]);

        let resp = facade.fetch("https://api.bilibili.com/x/web-interface/nav").await.unwrap();
        assert_eq!(resp, mixed_page());

        let err_transport = MockTransport::new(|_, _| Err(Error::Http("offline".to_string())));
        let facade = self::facade(err_transport.clone());
        enable(&facade, &["1"]);
        assert!(facade.fetch("https://api.bilibili.com/x/relation/tags").await.is_err());
        assert_eq!(err_transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_feed_request_routed_to_engine_when_filtering() {
        let transport = MockTransport::new(|_, _| Ok(mixed_page()));
        let facade = facade(transport.clone());
        enable(&facade, &["2"]);

        let request = RequestDescriptor::get(FEED_URL).with_header(COOKIE, HeaderValue::from_static("SESSDATA=1"));
        let resp = facade.send(request).await.unwrap();

        let items = feed_items(&resp);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id_str"], "b");
        assert_eq!(transport.requests()[0].headers.get(COOKIE).unwrap(), "SESSDATA=1");
    }

    #[tokio::test]
    async fn test_clearing_state_restores_passthrough() {
        let transport = MockTransport::new(|_, _| Ok(mixed_page()));
        let facade = facade(transport.clone());
        enable(&facade, &["2"]);
        lock_state(facade.state()).clear();

        let resp = facade.fetch(FEED_URL.to_string()).await.unwrap();
        assert_eq!(resp, mixed_page());
    }

    #[tokio::test]
    async fn test_concurrent_loads_do_not_lose_streak_updates() {
        let transport = MockTransport::new(|_, _| {
            Ok(feed_page(vec![feed_item("a", 5)], "", false))
        });
        let facade = facade(transport.clone());
        enable(&facade, &["1"]);

        let (a, b) = tokio::join!(facade.fetch(FEED_URL), facade.fetch(FEED_URL));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(lock_state(facade.state()).empty_streak(), 2);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_non_ok_feed_status_passes_through() {
        let transport = MockTransport::new(|_, _| {
            Ok(ResponseLike::new(StatusCode::PRECONDITION_FAILED, Default::default(), "412"))
        });
        let facade = facade(transport.clone());
        enable(&facade, &["1"]);

        let resp = facade.fetch(FEED_URL).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(transport.request_count(), 1);
    }
}
