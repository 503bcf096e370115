// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.
//!
//! Every [`ChromiumRenderer::launch`] starts a separate Chromium process with
//! its own throwaway profile directory, so concurrent requests never share
//! browser state.

use super::{RenderSession, Renderer};
use crate::config::RenderConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Interval between readiness selector checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on waiting for the browser process to exit.
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether a CDP error means the browser connection itself is gone, as
/// opposed to a query that found nothing or raced a navigation.
fn is_connection_lost(e: &CdpError) -> bool {
    matches!(
        e,
        CdpError::Ws(_) | CdpError::Io(_) | CdpError::NoResponse | CdpError::ChannelSendError(_)
    )
}

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Configured path
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. PAGETEXT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("PAGETEXT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Command-line switches derived from the render configuration.
pub fn launch_args(config: &RenderConfig) -> Vec<String> {
    let mut args = Vec::new();
    if config.headless {
        args.push("--headless=new".to_string());
    }
    if config.disable_gpu {
        args.push("--disable-gpu".to_string());
    }
    if config.no_sandbox {
        args.push("--no-sandbox".to_string());
    }
    args.push("--disable-dev-shm-usage".to_string());
    args.push("--disable-extensions".to_string());
    args.push("--disable-background-networking".to_string());
    args.push(format!("--user-agent={}", config.user_agent));
    args
}

/// Launches one Chromium process per session.
pub struct ChromiumRenderer {
    executable: PathBuf,
    config: RenderConfig,
}

impl ChromiumRenderer {
    /// Resolve the Chromium binary. Fails if none can be found.
    pub fn new(config: RenderConfig) -> Result<Self> {
        let executable = find_chromium(config.chromium_path.as_deref()).context(
            "Chromium not found. Install Chrome/Chromium or set PAGETEXT_CHROMIUM_PATH.",
        )?;
        Ok(Self { executable, config })
    }

    /// The binary sessions will be launched from.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .user_data_dir(profile_dir)
            .args(launch_args(&self.config));
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(port) = self.config.debugging_port {
            builder = builder.port(port);
        }
        builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        let profile = tempfile::Builder::new()
            .prefix("pagetext-profile-")
            .tempdir()
            .context("failed to create browser profile directory")?;
        let config = self.browser_config(profile.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("CDP handler event error: {e}");
                }
            }
        });

        debug!(profile = %profile.path().display(), "Chromium session launched");
        Ok(Box::new(ChromiumSession {
            browser,
            page: None,
            handler_task,
            _profile: profile,
        }))
    }
}

/// A single Chromium process and its active page.
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    /// Removed on drop, after the browser has exited.
    _profile: TempDir,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        match self.page.as_ref() {
            Some(page) => Ok(page),
            None => bail!("no page loaded; navigate first"),
        }
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        let result = tokio::time::timeout(timeout, page.goto(url))
            .await
            .map(|r| r.map(|_| ()));
        self.page = Some(page);

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => bail!("{e}"),
            Err(_) => bail!("timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            match tokio::time::timeout(remaining, page.find_element(selector)).await {
                Ok(Ok(_)) => return Ok(true),
                Ok(Err(e)) if is_connection_lost(&e) => {
                    return Err(anyhow::Error::new(e)
                        .context("browser connection lost while waiting for page"));
                }
                Ok(Err(e)) => trace!("`{selector}` not present yet: {e}"),
                Err(_) => return Ok(false),
            }
            tokio::time::sleep(POLL_INTERVAL.min(remaining)).await;
        }
    }

    async fn document_html(&mut self) -> Result<String> {
        let result = self
            .page()?
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn terminate(mut self: Box<Self>) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("failed to close page: {e}");
            }
        }

        if let Err(e) = self.browser.close().await {
            debug!("graceful browser close failed, killing: {e}");
            if let Some(Err(e)) = self.browser.kill().await {
                warn!("failed to kill Chromium: {e}");
            }
        }

        match tokio::time::timeout(EXIT_TIMEOUT, self.browser.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("failed to reap Chromium: {e}"),
            Err(_) => {
                warn!("Chromium did not exit in time, killing");
                if let Some(Err(e)) = self.browser.kill().await {
                    warn!("failed to kill Chromium: {e}");
                }
            }
        }

        self.handler_task.abort();
        Ok(())
    }
}
