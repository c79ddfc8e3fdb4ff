use bytes::Bytes;
use feedsieve_core::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// Everything needed to issue one HTTP request.
///
/// The URL is kept as the caller supplied it; parsing happens only where a
/// component needs structure (offset rewriting, sending).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

// A bare address string is a GET with no headers, the same as calling
// `fetch(url)` without options.
impl From<&str> for RequestDescriptor {
    fn from(url: &str) -> Self {
        Self::get(url)
    }
}

impl From<String> for RequestDescriptor {
    fn from(url: String) -> Self {
        Self::get(url)
    }
}

/// A fully buffered HTTP response.
///
/// The body is an immutable `Bytes` buffer, so inspecting it (`json`, `text`)
/// never consumes it and `clone` is a refcount bump. Whoever receives the
/// response can always read the whole body again.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseLike {
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseLike {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body with the matching content type.
    pub fn json_body(status: StatusCode, value: &serde_json::Value) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        Ok(Self::new(status, headers, serde_json::to_vec(value)?))
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 2xx, same meaning as `Response.ok` in the browser.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// A new response with the same status line and headers but a different
    /// body. `Content-Length` is dropped since it described the old body.
    pub fn replace_body(&self, body: impl Into<Bytes>) -> Self {
        let mut headers = self.headers.clone();
        headers.remove(CONTENT_LENGTH);
        Self {
            status: self.status,
            status_text: self.status_text.clone(),
            headers,
            body: body.into(),
        }
    }
}
