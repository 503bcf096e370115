//! `GET /youtube-transcript` against a mock YouTube origin.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pagetext_runtime::config::{RenderConfig, TranscriptConfig};
use pagetext_runtime::handler::{TranscriptHandler, WebContentHandler};
use pagetext_runtime::renderer::UnavailableRenderer;
use pagetext_runtime::rest::{router, AppState};
use pagetext_runtime::transcript::{fetch_transcript_text, YoutubeTranscriptClient};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

const TIMEDTEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.5">안녕하세요</text><text start="1.5" dur="2.1">오늘은 &amp;quot;러스트&amp;quot; 이야기</text><text start="3.6" dur="1">감사합니다</text></transcript>"#;

fn watch_page(server_uri: &str, tracks: &[(&str, Option<&str>)]) -> String {
    let tracks: Vec<Value> = tracks
        .iter()
        .map(|(lang, kind)| {
            let mut track = serde_json::json!({
                "baseUrl": format!("{server_uri}/api/timedtext?v={VIDEO_ID}&lang={lang}&fmt=srv3"),
                "languageCode": lang,
                "name": { "simpleText": lang },
            });
            if let Some(kind) = kind {
                track["kind"] = Value::from(*kind);
            }
            track
        })
        .collect();
    let captions = serde_json::json!({
        "playerCaptionsTracklistRenderer": { "captionTracks": tracks }
    });
    format!(
        "<html><script>var ytInitialPlayerResponse = {{\"captions\":{captions},\"videoDetails\":{{\"videoId\":\"{VIDEO_ID}\"}}}};</script></html>"
    )
}

async fn mock_youtube(tracks: &[(&str, Option<&str>)]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", VIDEO_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(watch_page(&server.uri(), tracks)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "ko"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TIMEDTEXT))
        .mount(&server)
        .await;
    server
}

fn app_for(server: &MockServer) -> axum::Router {
    let config = TranscriptConfig::default();
    let provider = Arc::new(YoutubeTranscriptClient::with_base_url(&config, &server.uri()).unwrap());
    let state = AppState {
        web: WebContentHandler::new(
            Arc::new(UnavailableRenderer::new("not needed")),
            RenderConfig::default(),
        ),
        transcripts: TranscriptHandler::new(provider, config),
    };
    router(Arc::new(state))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn transcript_uri(video_url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(video_url.as_bytes()).collect();
    format!("/youtube-transcript?url={encoded}")
}

#[tokio::test]
async fn test_transcript_segments_are_joined() {
    let server = mock_youtube(&[("en", None), ("ko", None)]).await;
    let uri = transcript_uri(&format!("https://www.youtube.com/watch?v={VIDEO_ID}"));
    let (status, body) = get(app_for(&server), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["text"],
        "안녕하세요 오늘은 \"러스트\" 이야기 감사합니다"
    );
}

#[tokio::test]
async fn test_short_url_and_generated_track() {
    let server = mock_youtube(&[("ko", Some("asr"))]).await;
    let uri = transcript_uri(&format!("https://youtu.be/{VIDEO_ID}"));
    let (status, body) = get(app_for(&server), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().starts_with("안녕하세요"));
}

#[tokio::test]
async fn test_missing_language_is_bad_request() {
    let server = mock_youtube(&[("en", None)]).await;
    let uri = transcript_uri(&format!("https://www.youtube.com/watch?v={VIDEO_ID}"));
    let (status, body) = get(app_for(&server), &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("no transcript"), "{detail}");
    assert!(detail.contains("en"), "{detail}");
}

#[tokio::test]
async fn test_invalid_video_url_is_bad_request() {
    let server = mock_youtube(&[("ko", None)]).await;
    let (status, body) = get(app_for(&server), &transcript_uri("https://example.com")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("invalid YouTube URL"));
}

#[tokio::test]
async fn test_upstream_error_status_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = TranscriptConfig::default();
    let provider = YoutubeTranscriptClient::with_base_url(&config, &server.uri()).unwrap();
    let err = fetch_transcript_text(
        &provider,
        &format!("https://youtu.be/{VIDEO_ID}"),
        &config.languages,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("503"), "{err}");
}

#[tokio::test]
async fn test_web_content_without_browser_reports_browser_error() {
    let server = mock_youtube(&[]).await;
    let encoded: String =
        url::form_urlencoded::byte_serialize("https://example.com".as_bytes()).collect();
    let (status, body) = get(app_for(&server), &format!("/web-content?url={encoded}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("browser not available"));
}
