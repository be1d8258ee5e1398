use thiserror::Error;

/// Classified failure of one resolution request.
///
/// Every failure is detected and classified at its point of origin (session,
/// detector, orchestrator) and propagated unchanged; only the HTTP layer maps
/// kinds to wire status codes. Heuristic exhaustion is deliberately *not* a
/// variant; it degrades to a warning on a successful resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The browser process could not be started at all.
    #[error("browser session could not be started: {0}")]
    SessionStart(String),

    /// Navigation timed out or the target host was unreachable.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The rendered page carries a CAPTCHA signature. Never solved, only
    /// reported, so callers can distinguish "blocked" from "broken".
    #[error("captcha detected on target page")]
    CaptchaDetected,

    /// Anything unclassified that happened mid-resolution.
    #[error("internal resolution error: {0}")]
    Internal(String),
}

impl ResolveError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}
