use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{self, ResolverConfig};
use crate::resolver::chromium::ChromiumEngine;
use crate::resolver::{Denylist, GateEngine};
use crate::server::rate_limit::ClientRateLimiter;

/// Shared handler state. Everything here is either immutable after startup
/// or internally synchronized; resolutions themselves share no state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn GateEngine>,
    pub denylist: Arc<Denylist>,
    pub rate_limiter: Arc<ClientRateLimiter>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Production state: Chromium engine, env-extended denylist, per-minute
    /// inbound rate limiting.
    pub fn new() -> Self {
        let resolver_config = ResolverConfig::from_env();
        Self::with_engine(Arc::new(ChromiumEngine::new(resolver_config)))
    }

    /// State with a caller-supplied engine (tests plug in fakes here).
    pub fn with_engine(engine: Arc<dyn GateEngine>) -> Self {
        Self {
            engine,
            denylist: Arc::new(Denylist::with_extra(&config::denylist_extra())),
            rate_limiter: Arc::new(ClientRateLimiter::new(
                config::rate_limit_per_minute(),
                Duration::from_secs(60),
            )),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
