// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! `pagetext extract <url>`: print the text of one page.

use crate::config::ServiceConfig;
use crate::handler::WebContentHandler;
use crate::renderer::chromium::ChromiumRenderer;
use anyhow::Result;
use std::sync::Arc;

pub async fn run(url: &str, config: ServiceConfig, json: bool) -> Result<()> {
    let renderer = Arc::new(ChromiumRenderer::new(config.render.clone())?);
    let handler = WebContentHandler::new(renderer, config.render);
    let result = handler.handle(url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
    }
    Ok(())
}
