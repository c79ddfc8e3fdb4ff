//! In-memory transport and payload builders shared by the unit tests.

use async_trait::async_trait;
use feedsieve_client::{RequestDescriptor, ResponseLike, Transport};
use feedsieve_core::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Handler = dyn Fn(&RequestDescriptor, usize) -> Result<ResponseLike> + Send + Sync;

/// Transport that answers every request from a closure and records what it saw.
/// The closure gets the request and its zero-based index.
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&RequestDescriptor, usize) -> Result<ResponseLike> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseLike> {
        let index = {
            let mut seen = self.requests.lock().unwrap();
            seen.push(request.clone());
            seen.len() - 1
        };
        (self.handler)(&request, index)
    }
}

pub fn query_param(request: &RequestDescriptor, key: &str) -> Option<String> {
    url::Url::parse(&request.url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn feed_item(id: &str, author: u64) -> Value {
    json!({
        "id_str": id,
        "type": "DYNAMIC_TYPE_AV",
        "modules": { "module_author": { "mid": author, "name": format!("up{}", author) } }
    })
}

pub fn feed_page(items: Vec<Value>, offset: &str, has_more: bool) -> ResponseLike {
    let body = json!({
        "code": 0,
        "message": "0",
        "data": { "items": items, "offset": offset, "has_more": has_more, "update_baseline": "0" }
    });
    ResponseLike::json_body(StatusCode::OK, &body).unwrap()
}

pub fn feed_items(response: &ResponseLike) -> Vec<Value> {
    let body: Value = response.json().unwrap();
    body["data"]["items"].as_array().cloned().unwrap()
}

pub const FEED_URL: &str =
    "https://api.bilibili.com/x/polymer/web-dynamic/v1/feed/all?timezone_offset=-480&type=all&page=1";
