//! Resolution orchestrator.
//!
//! Linear state machine around a single browser navigation:
//! open session → navigate → classify observed responses → CAPTCHA check →
//! settled-URL decision → optional heuristic extraction → metadata →
//! assemble. The session is closed exactly once on every exit path:
//! success, heuristic fallback, CAPTCHA, or any mid-flight error.

use tracing::{info, warn};

use super::captcha;
use super::denylist::Denylist;
use super::engine::{GateEngine, GateSession};
use super::error::ResolveError;
use super::heuristics;
use super::metadata;
use crate::core::types::PageMetadata;

/// Successful outcome of one resolution request.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub final_url: String,
    pub metadata: Option<PageMetadata>,
    /// Non-fatal anomalies, in arrival order.
    pub warnings: Vec<String>,
}

/// Resolve one gated link to its destination URL.
///
/// `gate_url` must already be sanitized and syntactically valid; the HTTP
/// boundary enforces that precondition and no further URL validation
/// happens here.
pub async fn resolve_gate_url(
    engine: &dyn GateEngine,
    denylist: &Denylist,
    gate_url: &str,
) -> Result<Resolution, ResolveError> {
    let mut session = engine.open().await?;

    // Everything after open() runs inside drive() so that close() is reached
    // no matter which step bailed out.
    let outcome = drive(session.as_mut(), denylist, gate_url).await;
    session.close().await;

    match &outcome {
        Ok(resolution) => info!(
            "✅ resolved {} -> {} ({} warnings)",
            gate_url,
            resolution.final_url,
            resolution.warnings.len()
        ),
        Err(e) => warn!("resolution of {} failed: {}", gate_url, e),
    }
    outcome
}

async fn drive(
    session: &mut dyn GateSession,
    denylist: &Denylist,
    gate_url: &str,
) -> Result<Resolution, ResolveError> {
    info!("🌐 resolving gated link: {}", gate_url);
    session.navigate(gate_url).await?;

    // Responses from the target site, sub-resources included. 404s carry no
    // signal worth surfacing; 429 means the gate itself is throttling us.
    let mut warnings = Vec::new();
    for response in session.observed_responses().await {
        match response.status {
            429 => warnings.push("Rate limit detected from target site.".to_string()),
            status @ 400..=499 if status != 404 => {
                warnings.push(format!("Client error: HTTP {status}"));
            }
            _ => {}
        }
    }

    let html = session.page_content().await?;
    if captcha::looks_like_captcha(&html) {
        return Err(ResolveError::CaptchaDetected);
    }

    let settled = session.settled_url().await?;

    let mut final_url = settled.clone();
    if settled == gate_url || denylist.matches(&settled) {
        match heuristics::extract_candidate_url(&html, denylist) {
            Some(candidate) => {
                info!("heuristic extraction found destination: {}", candidate);
                final_url = candidate;
            }
            None => {
                warn!("heuristic extraction exhausted for {}", settled);
                warnings.push(
                    "Could not heuristically extract final URL, returning current URL."
                        .to_string(),
                );
            }
        }
    }

    let metadata = metadata::extract_metadata(&html);

    Ok(Resolution {
        final_url,
        metadata,
        warnings,
    })
}
