//! Browser capability seam.
//!
//! The orchestrator only ever talks to these traits. Any engine that can
//! launch an isolated page, observe per-response status codes during a
//! navigation, report the settled URL, and hand back rendered page source is
//! substitutable. The production provider is `chromium::ChromiumEngine`;
//! tests plug in an in-memory fake.

use async_trait::async_trait;

use super::error::ResolveError;

/// One HTTP response observed while navigation was in flight.
///
/// Covers sub-resource requests as well as the top-level document; entries
/// are kept in observed-response order, never registration order.
#[derive(Debug, Clone)]
pub struct ObservedResponse {
    pub status: u16,
    pub url: String,
}

/// A live browser page tied to one resolution request.
///
/// The session is a scoped resource: whoever opens it must call [`close`]
/// exactly once on every exit path. Implementations may carry a Drop
/// backstop that reaps a leaked process, but callers must never rely on it.
///
/// [`close`]: GateSession::close
#[async_trait]
pub trait GateSession: Send {
    /// Navigate to `url` and wait until network activity is quiescent or the
    /// configured navigation timeout elapses.
    ///
    /// The response observer is registered when the session is opened, before
    /// any navigation is issued, so no early response can be missed.
    async fn navigate(&mut self, url: &str) -> Result<(), ResolveError>;

    /// The address-bar URL after navigation and any client-side redirects.
    async fn settled_url(&mut self) -> Result<String, ResolveError>;

    /// Full rendered page source.
    async fn page_content(&mut self) -> Result<String, ResolveError>;

    /// Snapshot of every HTTP response observed so far, in arrival order.
    async fn observed_responses(&mut self) -> Vec<ObservedResponse>;

    /// Tear the browser process down. Idempotent; never fails the request.
    async fn close(&mut self);
}

/// Factory for isolated, single-use browser sessions.
#[async_trait]
pub trait GateEngine: Send + Sync {
    async fn open(&self) -> Result<Box<dyn GateSession>, ResolveError>;
}
