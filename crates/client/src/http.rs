use async_trait::async_trait;
use feedsieve_core::config::{NetworkConfig, SessionConfig};
use feedsieve_core::{Error, Result};
use reqwest::header::{HeaderValue, COOKIE, REFERER, USER_AGENT};
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::transport::{RequestDescriptor, ResponseLike};
use crate::Transport;

/// 代理解析结果
enum ProxyResolution {
    UseProxy(String),
    /// 目标 host 命中 no_proxy，强制直连
    ForceDirectConnect,
    /// 未配置，跟随 HTTPS_PROXY / HTTP_PROXY 环境变量
    None,
}

/// 判断目标 host 是否命中 no_proxy 规则。
/// 支持：精确匹配、通配前缀 "*.example.com" / ".example.com"
fn is_no_proxy(host: &str, no_proxy_list: &[String]) -> bool {
    let host_lower = host.to_lowercase();
    for rule in no_proxy_list {
        let r = rule.trim().to_lowercase();
        if r.is_empty() {
            continue;
        }
        if let Some(suffix) = r.strip_prefix("*.") {
            // *.example.com only matches subdomains
            if host_lower.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if let Some(suffix) = r.strip_prefix('.') {
            if host_lower == suffix || host_lower.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if host_lower == r {
            return true;
        }
    }
    false
}

fn resolve_proxy(proxy: Option<&str>, no_proxy: &[String], target: &str) -> ProxyResolution {
    let Some(proxy) = proxy.map(str::trim).filter(|p| !p.is_empty()) else {
        return ProxyResolution::None;
    };

    if !no_proxy.is_empty() {
        let host = url::Url::parse(target)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_matches(['[', ']']).to_string()));
        if let Some(host) = host {
            if is_no_proxy(&host, no_proxy) {
                return ProxyResolution::ForceDirectConnect;
            }
        }
    }
    ProxyResolution::UseProxy(proxy.to_string())
}

/// Build the shared `reqwest::Client` for all API calls.
///
/// `target` is the API host the client will mostly talk to; it is only used
/// for `no_proxy` matching.
pub fn build_http_client(network: &NetworkConfig, target: &str) -> Client {
    let mut builder = Client::builder().timeout(Duration::from_secs(network.timeout_secs.max(1)));

    match resolve_proxy(network.proxy.as_deref(), &network.no_proxy, target) {
        ProxyResolution::UseProxy(proxy_url) => match Proxy::all(&proxy_url) {
            Ok(p) => {
                info!(proxy = %proxy_url, target = %target, "Using proxy");
                builder = builder.proxy(p);
            }
            Err(e) => {
                warn!(error = %e, proxy = %proxy_url, "Invalid proxy URL, falling back to direct connect");
            }
        },
        ProxyResolution::ForceDirectConnect => {
            info!(target = %target, "Target matches no_proxy, forcing direct connect");
            builder = builder.no_proxy();
        }
        ProxyResolution::None => {}
    }

    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build HTTP client with proxy, using default");
        Client::new()
    })
}

/// `Transport` backed by reqwest, carrying the browser session's cookie,
/// user agent and referer on every request that doesn't set its own.
pub struct ReqwestTransport {
    client: Client,
    cookie: Option<HeaderValue>,
    user_agent: Option<HeaderValue>,
    referer: Option<HeaderValue>,
}

impl ReqwestTransport {
    pub fn new(client: Client, session: &SessionConfig) -> Self {
        let header = |raw: &str, name: &str| -> Option<HeaderValue> {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            match HeaderValue::from_str(raw) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(error = %e, header = %name, "Ignoring session header with invalid characters");
                    None
                }
            }
        };

        Self {
            client,
            cookie: header(&session.cookie, "cookie"),
            user_agent: header(&session.user_agent, "user-agent"),
            referer: header(&session.referer, "referer"),
        }
    }

    fn apply_session(&self, request: &mut RequestDescriptor) {
        let defaults = [
            (COOKIE, &self.cookie),
            (USER_AGENT, &self.user_agent),
            (REFERER, &self.referer),
        ];
        for (name, value) in defaults {
            if let Some(value) = value {
                if !request.headers.contains_key(&name) {
                    request.headers.insert(name, value.clone());
                }
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, mut request: RequestDescriptor) -> Result<ResponseLike> {
        self.apply_session(&mut request);
        let url = url::Url::parse(&request.url)?;

        debug!(method = %request.method, url = %url, "Sending request");
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {} failed: {}", request.url, e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("failed to read body from {}: {}", request.url, e)))?;

        Ok(ResponseLike::new(status, headers, body))
    }
}
