// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API.
//!
//! `GET /web-content?url=` and `GET /youtube-transcript?url=` answer with
//! `{"text": ...}`. Every failure, whatever its cause, is a 400 with
//! `{"detail": ...}`.

use crate::error::ExtractError;
use crate::handler::{ExtractionResult, TranscriptHandler, WebContentHandler};
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Handlers shared by every request. Holds no per-request state.
pub struct AppState {
    pub web: WebContentHandler,
    pub transcripts: TranscriptHandler,
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/web-content", get(web_content))
        .route("/youtube-transcript", get(youtube_transcript))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the REST API until Ctrl-C.
pub async fn start(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await?;
    Ok(())
}

// ── Errors ──────────────────────────────────────────────────────

/// Client-facing error. Always rendered as 400 `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    MissingParam(&'static str),
    Extract(ExtractError),
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        ApiError::Extract(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self {
            ApiError::MissingParam(name) => format!("missing required query parameter: {name}"),
            ApiError::Extract(e) => e.to_string(),
        };
        let body = Json(serde_json::json!({ "detail": detail }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

// ── Handlers ────────────────────────────────────────────────────

/// The `url` query parameter. When it is repeated the last value wins.
fn url_param(query: Option<&str>) -> Result<String, ApiError> {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
                .last()
        })
        .ok_or(ApiError::MissingParam("url"))
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn web_content(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ExtractionResult>, ApiError> {
    let url = url_param(query.as_deref())?;
    Ok(Json(state.web.handle(&url).await?))
}

async fn youtube_transcript(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ExtractionResult>, ApiError> {
    let url = url_param(query.as_deref())?;
    Ok(Json(state.transcripts.handle(&url).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_is_bad_request() {
        let responses = [
            ApiError::MissingParam("url").into_response(),
            ApiError::from(ExtractError::InvalidUrl("x".into())).into_response(),
            ApiError::from(ExtractError::RenderTimeout {
                selector: "body".into(),
                timeout_ms: 1,
            })
            .into_response(),
            ApiError::from(ExtractError::Transcript("disabled".into())).into_response(),
        ];
        for response in responses {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_url_param_takes_last_value() {
        assert_eq!(
            url_param(Some("url=a&url=https%3A%2F%2Fexample.com%2F%3Fq%3D1")).unwrap(),
            "https://example.com/?q=1"
        );
        assert_eq!(url_param(Some("x=1&url=")).unwrap(), "");
    }

    #[test]
    fn test_url_param_missing() {
        for query in [None, Some(""), Some("u=1&URL=2")] {
            assert!(matches!(url_param(query), Err(ApiError::MissingParam("url"))));
        }
    }
}
