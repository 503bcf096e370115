// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Service configuration.
//!
//! Defaults are usable as-is. `PAGETEXT_*` environment variables override
//! them, and CLI flags override the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 1818;

/// Desktop Chrome identification sent with every browser request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Top-level configuration for the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub render: RenderConfig,
    pub transcript: TranscriptConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            render: RenderConfig::default(),
            transcript: TranscriptConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Defaults with `PAGETEXT_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup. Split out from [`from_env`] so
    /// tests do not have to mutate the process environment.
    ///
    /// [`from_env`]: ServiceConfig::from_env
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PAGETEXT_BIND") {
            self.bind = v
                .trim()
                .parse()
                .with_context(|| format!("PAGETEXT_BIND is not a socket address: {v}"))?;
        }
        if let Some(v) = lookup("PAGETEXT_CHROMIUM_PATH") {
            self.render.chromium_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("PAGETEXT_USER_AGENT") {
            self.render.user_agent = v;
        }
        if let Some(v) = lookup("PAGETEXT_READY_SELECTOR") {
            self.render.ready_selector = v;
        }
        if let Some(v) = lookup("PAGETEXT_READY_TIMEOUT_MS") {
            self.render.ready_timeout_ms = parse_ms("PAGETEXT_READY_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("PAGETEXT_SETTLE_MS") {
            self.render.settle_ms = parse_ms("PAGETEXT_SETTLE_MS", &v)?;
        }
        if let Some(v) = lookup("PAGETEXT_NAV_TIMEOUT_MS") {
            self.render.navigation_timeout_ms = parse_ms("PAGETEXT_NAV_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("PAGETEXT_DEBUG_PORT") {
            let port: u16 = v
                .trim()
                .parse()
                .with_context(|| format!("PAGETEXT_DEBUG_PORT is not a port: {v}"))?;
            self.render.debugging_port = Some(port);
        }
        if let Some(v) = lookup("PAGETEXT_TRANSCRIPT_LANGS") {
            self.transcript.languages = parse_languages(&v);
        }
        Ok(())
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number of milliseconds, got {value:?}"))
}

/// Split a comma-separated language list, dropping blanks.
pub fn parse_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Browser launch and page readiness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Explicit Chromium executable. Discovered automatically when unset.
    pub chromium_path: Option<PathBuf>,
    pub headless: bool,
    pub disable_gpu: bool,
    /// Required inside containers that lack user namespaces.
    pub no_sandbox: bool,
    /// Remote debugging port. `None` lets Chromium pick a free one, which is
    /// what concurrent requests need.
    pub debugging_port: Option<u16>,
    pub user_agent: String,
    /// CSS selector whose presence marks the document as ready.
    pub ready_selector: String,
    pub ready_timeout_ms: u64,
    /// Extra delay after readiness for script-driven DOM changes.
    pub settle_ms: u64,
    pub navigation_timeout_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chromium_path: None,
            headless: true,
            disable_gpu: true,
            no_sandbox: true,
            debugging_port: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ready_selector: "body".to_string(),
            ready_timeout_ms: 10_000,
            settle_ms: 2_000,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl RenderConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

/// Transcript provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Preferred caption languages, most preferred first.
    pub languages: Vec<String>,
    pub user_agent: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["ko".to_string()],
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
