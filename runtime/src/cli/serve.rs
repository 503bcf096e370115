// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! `pagetext serve`: run the HTTP service.

use crate::config::ServiceConfig;
use crate::handler::{TranscriptHandler, WebContentHandler};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{Renderer, UnavailableRenderer};
use crate::rest::{self, AppState};
use crate::transcript::YoutubeTranscriptClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the shared handlers from a resolved configuration.
pub fn build_state(config: &ServiceConfig) -> Result<AppState> {
    let renderer: Arc<dyn Renderer> = match ChromiumRenderer::new(config.render.clone()) {
        Ok(renderer) => {
            info!(chromium = %renderer.executable().display(), "Chromium renderer initialized");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("Failed to initialize Chromium: {e:#}");
            warn!("Running without a browser; /web-content requests will fail");
            Arc::new(UnavailableRenderer::new(format!("{e:#}")))
        }
    };

    let transcripts = Arc::new(YoutubeTranscriptClient::new(&config.transcript)?);

    Ok(AppState {
        web: WebContentHandler::new(renderer, config.render.clone()),
        transcripts: TranscriptHandler::new(transcripts, config.transcript.clone()),
    })
}

/// Start the service and block until shutdown.
pub async fn run(config: ServiceConfig) -> Result<()> {
    info!("starting pagetext v{}", env!("CARGO_PKG_VERSION"));
    let state = Arc::new(build_state(&config)?);
    rest::start(config.bind, state).await
}
