//! Page rendering through a throwaway headless Chromium.
//!
//! Larousse fills in entry content with JavaScript, so a plain GET is not
//! enough: the page is loaded in a real browser and serialized once its
//! network has gone idle.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::LoaderId;
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, FrameId, GetFrameTreeParams, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::config::SnapshotConfig;

/// Chrome's lifecycle event for "no network activity for 500 ms".
const NETWORK_IDLE: &str = "networkIdle";

/// Something that turns a URL into fully rendered HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
}

/// Renders pages in a fresh headless Chromium per call.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    /// Ceiling for navigation plus the network-idle wait.
    pub timeout: Duration,
    /// Path to Chrome/Chromium executable (None for auto-detection).
    pub chrome_path: Option<PathBuf>,
}

impl ChromiumRenderer {
    pub fn new(config: &SnapshotConfig) -> Self {
        Self {
            timeout: config.render_timeout,
            chrome_path: config.chrome_path.clone(),
        }
    }

    fn browser_config(&self, profile_dir: &std::path::Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .request_timeout(self.timeout)
            .no_sandbox()
            .disable_default_args()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-extensions")
            .arg("--disable-sync")
            .arg("--mute-audio");

        if let Some(ref chrome_path) = self.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        // A fresh profile per run keeps runs isolated; dropped (and deleted) on return.
        let profile = tempfile::Builder::new()
            .prefix("larousse-chromium-")
            .tempdir()
            .context("Failed to create browser profile directory")?;

        let (mut browser, mut handler) = Browser::launch(self.browser_config(profile.path())?)
            .await
            .context("Failed to launch browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        info!(url = %url, "Rendering page");
        let result = match tokio::time::timeout(self.timeout, capture(&browser, url)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "Timed out after {}s waiting for {url} to finish loading",
                self.timeout.as_secs()
            )),
        };

        // Tear down whatever happened above.
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            debug!("Failed to wait for browser exit: {e}");
        }
        handler_task.abort();

        if let Ok(ref html) = result {
            debug!(url = %url, bytes = html.len(), "Rendered page");
        }
        result
    }
}

/// Load `url` in a new tab and return the DOM once the network is idle.
async fn capture(browser: &Browser, url: &str) -> Result<String> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("Failed to open page")?;

    page.execute(SetLifecycleEventsEnabledParams::new(true))
        .await
        .context("Failed to enable lifecycle events")?;
    let mut lifecycle = page
        .event_listener::<EventLifecycleEvent>()
        .await
        .context("Failed to subscribe to lifecycle events")?;

    page.goto(url)
        .await
        .with_context(|| format!("Failed to navigate to {url}"))?;

    wait_for_network_idle(&page, &mut lifecycle).await?;

    page.content().await.context("Failed to read rendered DOM")
}

/// Block until the main frame's current document reports `networkIdle`.
///
/// Events from the initial `about:blank` load are ignored by matching the
/// loader id of the document `goto` navigated to.
async fn wait_for_network_idle(
    page: &Page,
    lifecycle: &mut (impl futures_util::Stream<Item = std::sync::Arc<EventLifecycleEvent>> + Unpin),
) -> Result<()> {
    let tree = page
        .execute(GetFrameTreeParams::default())
        .await
        .context("Failed to read frame tree")?;
    let main_frame = &tree.result.frame_tree.frame;

    while let Some(event) = lifecycle.next().await {
        if is_network_idle_for(&event, &main_frame.id, &main_frame.loader_id) {
            return Ok(());
        }
    }

    anyhow::bail!("Page closed before the network went idle")
}

/// Whether `event` is `networkIdle` for this frame's current document.
fn is_network_idle_for(event: &EventLifecycleEvent, frame_id: &FrameId, loader_id: &LoaderId) -> bool {
    event.name == NETWORK_IDLE && event.frame_id == *frame_id && event.loader_id == *loader_id
}
