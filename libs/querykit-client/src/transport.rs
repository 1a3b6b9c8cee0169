//! The injected transport boundary.
//!
//! The client never opens a socket itself: it hands a fully resolved
//! request descriptor to an implementation of [`Transport`] and relays the
//! outcome unchanged. Retries, timeouts, and cancellation all belong to
//! the transport.

use async_trait::async_trait;

use crate::resolver::ResolvedRequest;

/// Opaque transport failure, relayed to the caller without interpretation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Asynchronous request function injected into the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request described by `request` and return the decoded
    /// response value, or an opaque failure.
    async fn send(&self, request: ResolvedRequest) -> Result<serde_json::Value, BoxError>;
}
