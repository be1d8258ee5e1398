//! Native Chromium session provider using `chromiumoxide`.
//!
//! One isolated browser process and one page per resolution request:
//! executable discovery (env override → PATH scan → well-known install
//! paths), headless launch with a realistic desktop user agent and CI-safe
//! flags, navigation with a network-quiescence wait bounded by the
//! configured timeout, and a CDP `Network.responseReceived` observer that is
//! registered before any navigation is issued.
//!
//! Sessions are torn down with an explicit [`GateSession::close`]; a Drop
//! backstop reaps a leaked process but callers must not rely on it.

use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, EventResponseReceived};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::engine::{GateEngine, GateSession, ObservedResponse};
use super::error::ResolveError;
use crate::core::config::{self, ResolverConfig};

// ── Realistic desktop User-Agent pool ────────────────────────────────────────

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen realistic desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order: `CHROME_EXECUTABLE` env override → PATH scan →
/// OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = config::chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
            "brave-browser",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    let well_known: &[&str] = &[
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
    ];

    #[cfg(target_os = "linux")]
    let well_known: &[&str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/local/bin/chromium",
        "/usr/bin/brave-browser",
    ];

    #[cfg(target_os = "windows")]
    let well_known: &[&str] = &[
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
    ];

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    let well_known: &[&str] = &[];

    well_known
        .iter()
        .find(|c| Path::new(c).exists())
        .map(|c| c.to_string())
}

/// Headless launch config for one resolution session.
///
/// `--no-sandbox` / `--disable-dev-shm-usage` keep the browser usable in CI
/// and containerized environments.
fn build_session_config(exe: &str, cfg: &ResolverConfig) -> Result<BrowserConfig, ResolveError> {
    let ua = random_user_agent();

    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width: cfg.viewport_width,
            height: cfg.viewport_height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(cfg.viewport_width, cfg.viewport_height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio")
        .arg(format!("--user-agent={}", ua))
        .build()
        .map_err(|e| ResolveError::SessionStart(format!("failed to build browser config: {e}")))
}

// ── Engine / session ─────────────────────────────────────────────────────────

/// Production [`GateEngine`]: launches a fresh isolated Chromium per request.
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    config: ResolverConfig,
}

impl ChromiumEngine {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl GateEngine for ChromiumEngine {
    async fn open(&self) -> Result<Box<dyn GateSession>, ResolveError> {
        let exe = find_chrome_executable().ok_or_else(|| {
            ResolveError::SessionStart(
                "no browser found. Install Chrome or Chromium, or set CHROME_EXECUTABLE"
                    .to_string(),
            )
        })?;

        let browser_config = build_session_config(&exe, &self.config)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ResolveError::SessionStart(format!("failed to launch {exe}: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        let mut session = ChromiumSession {
            browser: Some(browser),
            page: None,
            handler_task: Some(handler_task),
            listener_task: None,
            responses: Arc::new(Mutex::new(Vec::new())),
            config: self.config.clone(),
        };

        let page = match session.browser_mut().new_page("about:blank").await {
            Ok(p) => p,
            Err(e) => {
                // Partial start: the process is up but unusable. Tear it down
                // here; the orchestrator never sees this session.
                session.close().await;
                return Err(ResolveError::SessionStart(format!(
                    "failed to open page: {e}"
                )));
            }
        };

        // Register the response observer before any navigation is issued.
        if let Err(e) = page.execute(EnableParams::default()).await {
            warn!("failed to enable Network domain: {}", e);
        }
        match page.event_listener::<EventResponseReceived>().await {
            Ok(mut events) => {
                let sink = Arc::clone(&session.responses);
                session.listener_task = Some(tokio::spawn(async move {
                    while let Some(event) = events.next().await {
                        sink.lock().await.push(ObservedResponse {
                            status: event.response.status as u16,
                            url: event.response.url.clone(),
                        });
                    }
                }));
            }
            Err(e) => warn!("response observer unavailable: {}", e),
        }

        info!("🚀 browser session opened ({})", exe);
        session.page = Some(page);
        Ok(Box::new(session))
    }
}

/// One live browser process + page. Closed exactly once by the orchestrator.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    listener_task: Option<JoinHandle<()>>,
    responses: Arc<Mutex<Vec<ObservedResponse>>>,
    config: ResolverConfig,
}

impl ChromiumSession {
    fn browser_mut(&mut self) -> &mut Browser {
        // Invariant: browser is Some until close(); open() hands the session
        // out only in that state.
        self.browser.as_mut().expect("session already closed")
    }

    fn page(&self) -> Result<&Page, ResolveError> {
        self.page
            .as_ref()
            .ok_or_else(|| ResolveError::internal("session has no open page"))
    }
}

#[async_trait]
impl GateSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ResolveError> {
        let timeout = self.config.nav_timeout;
        let quiet_ms = self.config.network_quiet_ms;
        let page = self.page()?;

        let navigation = async {
            page.goto(url)
                .await
                .map_err(|e| ResolveError::Navigation(format!("failed to reach {url}: {e}")))?;
            wait_for_quiescence(page, quiet_ms).await;
            Ok(())
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ResolveError::Navigation(format!(
                "navigation to {url} timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn settled_url(&mut self) -> Result<String, ResolveError> {
        self.page()?
            .url()
            .await
            .map_err(|e| ResolveError::internal(format!("failed to read page url: {e}")))?
            .ok_or_else(|| ResolveError::internal("page reported no url"))
    }

    async fn page_content(&mut self) -> Result<String, ResolveError> {
        self.page()?
            .content()
            .await
            .map_err(|e| ResolveError::internal(format!("failed to read page content: {e}")))
    }

    async fn observed_responses(&mut self) -> Vec<ObservedResponse> {
        self.responses.lock().await.clone()
    }

    async fn close(&mut self) {
        if let Some(task) = self.listener_task.take() {
            task.abort();
        }
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("browser close error (non-fatal): {}", e);
            }
            info!("🛑 browser session closed");
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Backstop only; close() is the contract. Drop cannot await, so
        // spawn the teardown when a runtime is still around.
        let Some(mut browser) = self.browser.take() else {
            return;
        };
        warn!("browser session dropped without close(); reaping process");
        let listener = self.listener_task.take();
        let handler = self.handler_task.take();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        runtime.spawn(async move {
            if let Some(task) = listener {
                task.abort();
            }
            let _ = browser.close().await;
            if let Some(task) = handler {
                task.abort();
            }
        });
    }
}

/// Wait until the page network goes idle: DOM readyState `complete` and no
/// new resource entries for `quiet_ms` consecutive milliseconds.
///
/// Polls `performance.getEntriesByType("resource").length` every 250 ms, a
/// networkidle heuristic that works without wiring up CDP lifecycle events.
/// Unbounded by itself; the caller's navigation timeout is the bound.
async fn wait_for_quiescence(page: &Page, quiet_ms: u64) {
    let poll = Duration::from_millis(250);
    let mut last_count: u64 = 0;
    let mut stable_since = std::time::Instant::now();

    loop {
        let count: u64 = page
            .evaluate("performance.getEntriesByType('resource').length")
            .await
            .ok()
            .and_then(|v| v.into_value::<serde_json::Value>().ok())
            .and_then(|j| j.as_u64())
            .unwrap_or(0);

        let ready: bool = page
            .evaluate("document.readyState")
            .await
            .ok()
            .and_then(|v| v.into_value::<serde_json::Value>().ok())
            .and_then(|j| j.as_str().map(|s| s == "complete"))
            .unwrap_or(false);

        if !ready || count != last_count {
            last_count = count;
            stable_since = std::time::Instant::now();
        } else if stable_since.elapsed().as_millis() as u64 >= quiet_ms {
            return;
        }

        tokio::time::sleep(poll).await;
    }
}
