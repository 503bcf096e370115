// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! YouTube caption text.
//!
//! Extracts the video id from a URL, then asks a [`TranscriptProvider`] for
//! the caption segments. [`YoutubeTranscriptClient`] reads the caption track
//! list out of the watch page and downloads the timedtext XML.

use crate::config::TranscriptConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Public YouTube origin.
pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Tried in order; the first capture wins.
const VIDEO_ID_PATTERNS: &[&str] = &[
    r"(?:v=|/)([0-9A-Za-z_-]{11}).*",
    r"(?:embed/)([0-9A-Za-z_-]{11})",
    r"(?:youtu\.be/)([0-9A-Za-z_-]{11})",
];

fn video_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        VIDEO_ID_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("video id regex is valid"))
            .collect()
    })
}

fn markup_pattern() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| Regex::new(r"<[^>]*>").expect("markup regex is valid"))
}

/// Pull the 11-character video id out of a watch, embed, or short URL.
pub fn extract_video_id(url: &str) -> Result<String, ExtractError> {
    video_id_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::InvalidVideoUrl(url.to_string()))
}

/// One caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Source of caption segments for a video.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, ExtractError>;
}

/// Fetch a video's captions and join them into one string.
pub async fn fetch_transcript_text(
    provider: &dyn TranscriptProvider,
    url: &str,
    languages: &[String],
) -> Result<String, ExtractError> {
    let video_id = extract_video_id(url)?;
    let segments = provider.fetch(&video_id, languages).await?;
    info!(video_id = %video_id, segments = segments.len(), "transcript fetched");
    Ok(segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

/// One entry of `captionTracks` in the player response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsJson {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// Transcript provider backed by the public YouTube watch page.
pub struct YoutubeTranscriptClient {
    http: reqwest::Client,
    base_url: String,
}

impl YoutubeTranscriptClient {
    pub fn new(config: &TranscriptConfig) -> Result<Self, ExtractError> {
        Self::with_base_url(config, YOUTUBE_BASE_URL)
    }

    /// Point the client at a different origin (used by tests).
    pub fn with_base_url(config: &TranscriptConfig, base_url: &str) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ExtractError::Transcript(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, ExtractError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExtractError::Transcript(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| ExtractError::Transcript(e.to_string()))
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptClient {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, ExtractError> {
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        let html = self.get_text(&watch_url).await?;

        let tracks = parse_caption_tracks(&html, video_id)?;
        debug!(video_id, tracks = tracks.len(), "caption tracks found");

        let track = select_track(&tracks, languages).ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            ExtractError::Transcript(format!(
                "no transcript for {video_id} in {languages:?} (available: {available:?})"
            ))
        })?;

        let xml = self.get_text(&track.base_url.replace("&fmt=srv3", "")).await?;
        parse_timedtext(&xml)
    }
}

/// Read `captionTracks` out of the JSON embedded in the watch page.
fn parse_caption_tracks(html: &str, video_id: &str) -> Result<Vec<CaptionTrack>, ExtractError> {
    let Some((_, rest)) = html.split_once("\"captions\":") else {
        if html.contains("\"playabilityStatus\":{\"status\":\"ERROR\"") {
            return Err(ExtractError::Transcript(format!(
                "video {video_id} is unavailable"
            )));
        }
        return Err(ExtractError::Transcript(format!(
            "transcripts are disabled for video {video_id}"
        )));
    };
    let json = rest
        .split_once(",\"videoDetails")
        .map(|(captions, _)| captions)
        .unwrap_or(rest);

    let captions: CaptionsJson = serde_json::from_str(json).map_err(|e| {
        ExtractError::Transcript(format!("malformed caption data for {video_id}: {e}"))
    })?;

    let tracks = captions
        .player_captions_tracklist_renderer
        .map(|r| r.caption_tracks)
        .unwrap_or_default();
    if tracks.is_empty() {
        return Err(ExtractError::Transcript(format!(
            "no caption tracks for video {video_id}"
        )));
    }
    Ok(tracks)
}

/// Pick the first language with a track, preferring manual over generated.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut matching = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = matching.clone().find(|t| !t.is_generated());
        manual.or_else(|| matching.next())
    })
}

/// Parse timedtext XML (`<transcript><text start dur>...</text>`).
fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>, ExtractError> {
    let malformed = |e: &dyn std::fmt::Display| {
        ExtractError::Transcript(format!("malformed timedtext: {e}"))
    };

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<TranscriptSegment> = None;

    loop {
        match reader.read_event().map_err(|e| malformed(&e))? {
            Event::Start(e) if e.name().as_ref() == b"text" => {
                let start = attr_f64(&e, "start").map_err(|e| malformed(&e))?;
                let duration = attr_f64(&e, "dur").map_err(|e| malformed(&e))?;
                current = Some(TranscriptSegment {
                    text: String::new(),
                    start,
                    duration,
                });
            }
            Event::Text(t) => {
                if let Some(seg) = current.as_mut() {
                    seg.text.push_str(&t.unescape().map_err(|e| malformed(&e))?);
                }
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let Some(mut seg) = current.take() {
                    seg.text = clean_caption_text(&seg.text);
                    if !seg.text.is_empty() {
                        segments.push(seg);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(segments)
}

fn attr_f64(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Result<f64, quick_xml::Error> {
    let value = match e.try_get_attribute(name)? {
        Some(attr) => attr.unescape_value()?.parse().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(value)
}

/// Captions arrive entity-escaped twice and may carry formatting tags.
fn clean_caption_text(raw: &str) -> String {
    let decoded = quick_xml::escape::unescape(raw)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    markup_pattern().replace_all(&decoded, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_variants() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42", "dQw4w9WgXcQ"),
            ("https://youtu.be/dQw4w9WgXcQ?si=abc", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://m.youtube.com/shorts/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
        ];
        for (url, id) in cases {
            assert_eq!(extract_video_id(url).unwrap(), id, "{url}");
        }
    }

    #[test]
    fn test_extract_video_id_rejects_short_ids() {
        for url in ["https://www.youtube.com/watch?v=short", "not a url", ""] {
            let err = extract_video_id(url).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidVideoUrl(_)), "{url}");
        }
    }

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.com/{lang}/{}", kind.unwrap_or("manual")),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_select_track_prefers_language_order_then_manual() {
        let tracks = vec![
            track("en", None),
            track("ko", Some("asr")),
            track("ko", None),
        ];
        let langs = vec!["ko".to_string(), "en".to_string()];
        let chosen = select_track(&tracks, &langs).unwrap();
        assert_eq!(chosen.language_code, "ko");
        assert!(!chosen.is_generated());

        let only_generated = vec![track("ko", Some("asr"))];
        assert!(select_track(&only_generated, &langs).unwrap().is_generated());

        assert!(select_track(&tracks, &["ja".to_string()]).is_none());
    }

    #[test]
    fn test_parse_caption_tracks_from_watch_page() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=ko","languageCode":"ko","kind":"asr"}]}},"videoDetails":{"videoId":"abc"}};</script>"#;
        let tracks = parse_caption_tracks(html, "abc").unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(
            tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=ko"
        );
        assert!(tracks[0].is_generated());
    }

    #[test]
    fn test_parse_caption_tracks_disabled() {
        let err = parse_caption_tracks("<html>no captions here</html>", "abc").unwrap_err();
        assert!(err.to_string().contains("disabled"));

        let unavailable = r#"{"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}}"#;
        let err = parse_caption_tracks(unavailable, "abc").unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_parse_timedtext_decodes_entities() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.2">안녕하세요</text><text start="1.7" dur="2">it&amp;#39;s &lt;i&gt;fine&lt;/i&gt;</text><text start="4" dur="1"></text></transcript>"#;
        let segments = parse_timedtext(xml).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "안녕하세요");
        assert_eq!(segments[0].start, 0.5);
        assert_eq!(segments[1].text, "it's fine");
        assert_eq!(segments[1].duration, 2.0);
    }
}
