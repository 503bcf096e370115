// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request orchestration.
//!
//! A web-content request moves through `Validating → Rendering → Extracting`
//! and ends in `Succeeded` or `Failed`. Validation happens before any browser
//! is launched, and [`render_page`] has released the browser by the time the
//! extractor runs or an error is returned.

use crate::config::{RenderConfig, TranscriptConfig};
use crate::error::ExtractError;
use crate::extract::extract_text;
use crate::renderer::{render_page, Renderer};
use crate::transcript::{fetch_transcript_text, TranscriptProvider};
use crate::validate::validate_url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Position of a request in the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Validating,
    Rendering,
    Extracting,
    Succeeded,
    Failed,
}

/// Successful response body for both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
}

/// Runs validate → render → extract for one URL.
pub struct WebContentHandler {
    renderer: Arc<dyn Renderer>,
    config: RenderConfig,
}

impl WebContentHandler {
    pub fn new(renderer: Arc<dyn Renderer>, config: RenderConfig) -> Self {
        Self { renderer, config }
    }

    /// Extract the visible text of the page at `raw_url`.
    pub async fn handle(&self, raw_url: &str) -> Result<ExtractionResult, ExtractError> {
        let start = Instant::now();
        let mut stage = ExtractionStage::Validating;
        let outcome = self.run(raw_url, &mut stage).await;

        match &outcome {
            Ok(result) => {
                stage = ExtractionStage::Succeeded;
                info!(
                    url = raw_url,
                    ?stage,
                    chars = result.text.chars().count(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "web content extracted"
                );
            }
            Err(e) => {
                let failed_in = stage;
                stage = ExtractionStage::Failed;
                warn!(
                    url = raw_url,
                    ?stage,
                    ?failed_in,
                    kind = e.kind(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "web content extraction failed: {e}"
                );
            }
        }
        outcome
    }

    async fn run(
        &self,
        raw_url: &str,
        stage: &mut ExtractionStage,
    ) -> Result<ExtractionResult, ExtractError> {
        let url = validate_url(raw_url)?;

        *stage = ExtractionStage::Rendering;
        debug!(url = %url, ?stage, "stage transition");
        let page = render_page(self.renderer.as_ref(), url.as_str(), &self.config).await?;

        *stage = ExtractionStage::Extracting;
        debug!(url = %page.source_url, ?stage, bytes = page.html.len(), "stage transition");
        let text = extract_text(&page.html)?;

        Ok(ExtractionResult { text })
    }
}

/// Resolves a video URL to its caption text.
pub struct TranscriptHandler {
    provider: Arc<dyn TranscriptProvider>,
    config: TranscriptConfig,
}

impl TranscriptHandler {
    pub fn new(provider: Arc<dyn TranscriptProvider>, config: TranscriptConfig) -> Self {
        Self { provider, config }
    }

    pub async fn handle(&self, url: &str) -> Result<ExtractionResult, ExtractError> {
        match fetch_transcript_text(self.provider.as_ref(), url, &self.config.languages).await {
            Ok(text) => Ok(ExtractionResult { text }),
            Err(e) => {
                warn!(url, kind = e.kind(), "transcript fetch failed: {e}");
                Err(e)
            }
        }
    }
}
