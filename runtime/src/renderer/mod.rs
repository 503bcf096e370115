// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! A [`Renderer`] launches one [`RenderSession`] (one browser process) per
//! request. [`render_page`] drives a session through navigation, the
//! readiness wait and the settle wait, and always terminates it before
//! returning.

pub mod chromium;

use crate::config::RenderConfig;
use crate::error::ExtractError;
use anyhow::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Fully rendered HTML of one page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub source_url: String,
}

/// A browser engine that launches isolated sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Start a fresh browser instance for a single request.
    async fn launch(&self) -> Result<Box<dyn RenderSession>>;
}

/// One exclusively-owned browser instance.
#[async_trait]
pub trait RenderSession: Send {
    /// Navigate to a URL, failing if it cannot be loaded within `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;
    /// Wait until `selector` matches an element. Returns `false` if it did
    /// not appear within `timeout`.
    async fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<bool>;
    /// Serialized HTML of the current document.
    async fn document_html(&mut self) -> Result<String>;
    /// Shut down the browser process.
    async fn terminate(self: Box<Self>) -> Result<()>;
}

/// Stand-in used when no Chromium binary is available.
///
/// The transcript endpoint keeps working; web-content requests fail with a
/// browser error.
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Renderer for UnavailableRenderer {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        Err(anyhow::anyhow!("browser not available: {}", self.reason))
    }
}

/// Owning guard over a [`RenderSession`].
///
/// [`SessionGuard::release`] is the normal exit. If the guard is dropped
/// without it (panic, or the enclosing future being cancelled), termination
/// is spawned on the runtime captured at construction.
pub struct SessionGuard {
    session: Option<Box<dyn RenderSession>>,
    runtime: tokio::runtime::Handle,
}

impl SessionGuard {
    /// Wrap a freshly launched session. Must be called inside a tokio runtime.
    pub fn new(session: Box<dyn RenderSession>) -> Self {
        Self {
            session: Some(session),
            runtime: tokio::runtime::Handle::current(),
        }
    }

    /// Mutable access to the live session.
    pub fn session(&mut self) -> Result<&mut (dyn RenderSession + 'static)> {
        self.session
            .as_deref_mut()
            .ok_or_else(|| anyhow::anyhow!("browser session already released"))
    }

    /// Terminate the session now. Failures are logged, not returned.
    pub async fn release(mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.terminate().await {
                warn!("failed to terminate browser session: {e:#}");
            } else {
                debug!("browser session terminated");
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.runtime.spawn(async move {
                if let Err(e) = session.terminate().await {
                    warn!("browser session cleanup on drop failed: {e:#}");
                } else {
                    debug!("browser session terminated on drop");
                }
            });
        }
    }
}

/// Launch a session, load `url`, wait for readiness, and return its HTML.
///
/// The session is released on every path before this returns.
pub async fn render_page(
    renderer: &dyn Renderer,
    url: &str,
    config: &RenderConfig,
) -> Result<RenderedPage, ExtractError> {
    let start = Instant::now();
    let session = renderer
        .launch()
        .await
        .map_err(|e| ExtractError::Browser(format!("{e:#}")))?;

    let mut guard = SessionGuard::new(session);
    let outcome = match guard.session() {
        Ok(session) => load_html(session, url, config).await,
        Err(e) => Err(ExtractError::Browser(e.to_string())),
    };
    guard.release().await;

    let html = outcome?;
    info!(
        url,
        bytes = html.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "page rendered"
    );
    Ok(RenderedPage {
        html,
        source_url: url.to_string(),
    })
}

async fn load_html(
    session: &mut dyn RenderSession,
    url: &str,
    config: &RenderConfig,
) -> Result<String, ExtractError> {
    session
        .navigate(url, config.navigation_timeout())
        .await
        .map_err(|e| ExtractError::Navigation(format!("{e:#}")))?;

    let ready = session
        .wait_for_element(&config.ready_selector, config.ready_timeout())
        .await
        .map_err(|e| ExtractError::Browser(format!("{e:#}")))?;
    if !ready {
        return Err(ExtractError::RenderTimeout {
            selector: config.ready_selector.clone(),
            timeout_ms: config.ready_timeout_ms,
        });
    }

    // Readiness only means the container exists; give scripts a moment.
    if config.settle_ms > 0 {
        tokio::time::sleep(config.settle()).await;
    }

    session
        .document_html()
        .await
        .map_err(|e| ExtractError::Browser(format!("{e:#}")))
}
