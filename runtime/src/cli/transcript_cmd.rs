// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! `pagetext transcript <url>`: print the captions of one video.

use crate::config::ServiceConfig;
use crate::handler::TranscriptHandler;
use crate::transcript::YoutubeTranscriptClient;
use anyhow::Result;
use std::sync::Arc;

pub async fn run(url: &str, config: ServiceConfig, json: bool) -> Result<()> {
    let provider = Arc::new(YoutubeTranscriptClient::new(&config.transcript)?);
    let handler = TranscriptHandler::new(provider, config.transcript);
    let result = handler.handle(url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
    }
    Ok(())
}
