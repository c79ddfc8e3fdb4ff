pub mod http;
pub mod session;
pub mod transport;

use async_trait::async_trait;
use feedsieve_core::Result;

pub use http::{build_http_client, ReqwestTransport};
pub use session::{CookieSession, SessionIdentity};
pub use transport::{RequestDescriptor, ResponseLike};

/// The raw network transport the filter layer sits on top of.
///
/// Implementations return `Err` only for transport-level failures (DNS,
/// connect, timeout). Any HTTP status, including 4xx/5xx, comes back as an
/// `Ok(ResponseLike)`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseLike>;
}
