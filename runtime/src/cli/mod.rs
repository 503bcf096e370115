// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the `pagetext` binary.

pub mod doctor;
pub mod extract_cmd;
pub mod serve;
pub mod transcript_cmd;

use crate::config::{parse_languages, ServiceConfig};
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Browser and transcript flags shared by several subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Chromium executable (overrides PAGETEXT_CHROMIUM_PATH)
    #[arg(long)]
    pub chromium: Option<PathBuf>,

    /// Fixed remote debugging port for the browser. Unset by default so each
    /// request's browser picks a free port. With a fixed port, concurrent
    /// requests conflict because only one browser can hold it at a time.
    #[arg(long)]
    pub debug_port: Option<u16>,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headed: bool,

    /// CSS selector that marks the page as ready
    #[arg(long)]
    pub ready_selector: Option<String>,

    /// How long to wait for the ready selector, in milliseconds
    #[arg(long)]
    pub ready_timeout_ms: Option<u64>,

    /// Extra wait after readiness for scripts to settle, in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Preferred caption languages, comma separated (e.g. "ko,en")
    #[arg(long)]
    pub langs: Option<String>,
}

impl ConfigArgs {
    /// Layer the flags over an existing configuration.
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(path) = &self.chromium {
            config.render.chromium_path = Some(path.clone());
        }
        if let Some(port) = self.debug_port {
            config.render.debugging_port = Some(port);
        }
        if self.headed {
            config.render.headless = false;
        }
        if let Some(selector) = &self.ready_selector {
            config.render.ready_selector = selector.clone();
        }
        if let Some(ms) = self.ready_timeout_ms {
            config.render.ready_timeout_ms = ms;
        }
        if let Some(ms) = self.settle_ms {
            config.render.settle_ms = ms;
        }
        if let Some(langs) = &self.langs {
            config.transcript.languages = parse_languages(langs);
        }
    }

    /// Environment-derived configuration with these flags on top.
    pub fn resolve(&self, bind: Option<SocketAddr>) -> anyhow::Result<ServiceConfig> {
        let mut config = ServiceConfig::from_env()?;
        self.apply(&mut config);
        if let Some(addr) = bind {
            config.bind = addr;
        }
        Ok(config)
    }
}
