//! Env-var driven configuration, parse-or-default throughout.

use std::path::Path;
use std::time::Duration;

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_NAV_TIMEOUT_SECS: &str = "LINKPEEL_NAV_TIMEOUT_SECS";
pub const ENV_NETWORK_QUIET_MS: &str = "LINKPEEL_NETWORK_QUIET_MS";
pub const ENV_RATE_LIMIT_PER_MIN: &str = "LINKPEEL_RATE_LIMIT_PER_MIN";
pub const ENV_DENYLIST_EXTRA: &str = "LINKPEEL_DENYLIST_EXTRA";

/// Per-session browser tuning.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on one navigation, network-idle wait included.
    pub nav_timeout: Duration,
    /// Consecutive quiet window that counts as "network settled".
    pub network_quiet_ms: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nav_timeout: Duration::from_secs(30),
            network_quiet_ms: 1_500,
            viewport_width: 1280,
            viewport_height: 900,
        }
    }
}

impl ResolverConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            nav_timeout: std::env::var(ENV_NAV_TIMEOUT_SECS)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.nav_timeout),
            network_quiet_ms: std::env::var(ENV_NETWORK_QUIET_MS)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.network_quiet_ms),
            ..defaults
        }
    }
}

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (`resolver::chromium::find_chrome_executable`);
/// this only returns a value when `CHROME_EXECUTABLE` points at an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

/// Inbound budget per client IP per minute. Default: 30.
pub fn rate_limit_per_minute() -> u32 {
    std::env::var(ENV_RATE_LIMIT_PER_MIN)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(30)
}

/// Additional denylist fragments, comma-separated. Additive only; the
/// built-in table always applies.
pub fn denylist_extra() -> Vec<String> {
    std::env::var(ENV_DENYLIST_EXTRA)
        .ok()
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
