//! The feed response envelope: `{ code, data: { items, offset, has_more, ... } }`.
//!
//! Only `data.items`, `data.offset` and `data.has_more` are ever looked at;
//! everything else is kept verbatim as JSON and re-serialized untouched.

use feedsieve_client::ResponseLike;
use feedsieve_core::{Identity, Result};
use serde_json::Value;
use tracing::debug;

/// Result of inspecting a response body without consuming it.
#[derive(Debug)]
pub enum Peek {
    /// Body is a feed envelope with an `items` array.
    Feed(FeedEnvelope),
    /// Shape we don't understand; the response must be passed on untouched.
    Passthrough(&'static str),
}

#[derive(Debug, Clone)]
pub struct FeedEnvelope {
    root: Value,
}

impl FeedEnvelope {
    pub fn peek(response: &ResponseLike) -> Peek {
        let root: Value = match response.json() {
            Ok(root) => root,
            Err(e) => {
                debug!(error = %e, "Feed body is not JSON");
                return Peek::Passthrough("body is not valid JSON");
            }
        };
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Peek {
        if root.pointer("/data/items").map_or(false, Value::is_array) {
            Peek::Feed(Self { root })
        } else {
            Peek::Passthrough("envelope has no data.items array")
        }
    }

    pub fn items(&self) -> &[Value] {
        self.root
            .pointer("/data/items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Raw `data.offset`, if it holds a usable token.
    fn offset_value(&self) -> Option<&Value> {
        self.root.pointer("/data/offset").filter(|v| is_truthy(v))
    }

    /// `data.offset` as a query-string token.
    pub fn offset(&self) -> Option<String> {
        match self.offset_value()? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn has_more(&self) -> bool {
        self.root.pointer("/data/has_more").map_or(false, is_truthy)
    }

    pub fn set_items(&mut self, items: Vec<Value>) {
        if let Some(slot) = self.root.pointer_mut("/data/items") {
            *slot = Value::Array(items);
        }
    }

    pub fn set_has_more(&mut self, has_more: bool) {
        if let Some(data) = self.root.get_mut("data").and_then(Value::as_object_mut) {
            data.insert("has_more".to_string(), Value::Bool(has_more));
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.root)?)
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Author id of one feed item, read through a JSON pointer.
pub fn author_of(item: &Value, pointer: &str) -> Option<Identity> {
    item.pointer(pointer).and_then(Identity::from_json)
}

// Loose truthiness, matching how the web client itself treats these fields:
// `has_more` has been seen as both a bool and 0/1, `offset` as string or number.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
