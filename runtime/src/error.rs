// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the extraction pipeline.
//!
//! Every variant renders a human-readable message. The HTTP layer collapses
//! all of them into a single 400 response, but [`ExtractError::kind`] keeps the
//! distinction available for logs.

/// All failures the extraction and transcript pipelines can produce.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page did not become ready within {timeout_ms}ms (waiting for `{selector}`)")]
    RenderTimeout { selector: String, timeout_ms: u64 },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("invalid YouTube URL: {0}")]
    InvalidVideoUrl(String),

    #[error("transcript unavailable: {0}")]
    Transcript(String),
}

impl ExtractError {
    /// Stable machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::InvalidUrl(_) => "invalid_url",
            ExtractError::Navigation(_) => "navigation",
            ExtractError::RenderTimeout { .. } => "render_timeout",
            ExtractError::Browser(_) => "browser",
            ExtractError::Extraction(_) => "extraction",
            ExtractError::InvalidVideoUrl(_) => "invalid_video_url",
            ExtractError::Transcript(_) => "transcript",
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Nothing retries today; any retry loop added later must consult this so
    /// that malformed input is never re-attempted.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ExtractError::Navigation(_) | ExtractError::RenderTimeout { .. }
        )
    }
}
