//! YouTube transcript provider.
//!
//! Resolves caption tracks through the innertube player endpoint and parses the
//! timed-text XML of the selected track into segments.

use super::{ProviderError, Segment, TranscriptProvider};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const USER_AGENT: &str = concat!("transcript-harvest/", env!("CARGO_PKG_VERSION"));

/// Canonical watch URL for a video.
pub fn video_url(video_id: &str) -> String {
    format!("{}?v={}", WATCH_URL, video_id)
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches various YouTube URL formats and bare video IDs
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    })
}

fn api_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("Invalid regex")
    })
}

fn text_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<text((?:\s+[\w:-]+="[^"]*")*)\s*>(.*?)</text>"#).expect("Invalid regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([\w:-]+)="([^"]*)""#).expect("Invalid regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex"))
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("Invalid regex"))
}

/// Extract a video ID from a YouTube URL or a bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// A caption track advertised by the player response.
#[derive(Debug, Clone, PartialEq)]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    generated: bool,
}

/// YouTube transcript provider.
pub struct YoutubeTranscriptProvider {
    client: reqwest::Client,
}

impl YoutubeTranscriptProvider {
    /// Create a provider with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_api_key(&self, video_id: &str) -> std::result::Result<String, ProviderError> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_api_key(&html)
    }

    async fn fetch_caption_tracks(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> std::result::Result<Vec<CaptionTrack>, ProviderError> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let json: serde_json::Value = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_caption_tracks(video_id, &json)
    }

    async fn fetch_timed_text(&self, track: &CaptionTrack) -> std::result::Result<String, ProviderError> {
        let url = timed_text_url(&track.base_url)?;
        let xml = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(xml)
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        video_id: &str,
        language: &str,
    ) -> std::result::Result<Vec<Segment>, ProviderError> {
        let api_key = self.fetch_api_key(video_id).await?;
        let tracks = self.fetch_caption_tracks(video_id, &api_key).await?;

        let Some(track) = select_track(&tracks, language) else {
            debug!("No '{}' caption track among {} tracks", language, tracks.len());
            return Ok(Vec::new());
        };

        debug!(
            "Using {} track for '{}'",
            if track.generated { "generated" } else { "manual" },
            track.language_code
        );

        let xml = self.fetch_timed_text(track).await?;
        parse_timed_text(&xml)
    }
}

fn extract_api_key(html: &str) -> std::result::Result<String, ProviderError> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(ProviderError::new(
            "429 Too Many Requests: YouTube answered with a captcha challenge",
        ));
    }

    api_key_regex()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ProviderError::new("Could not find the innertube API key on the watch page"))
}

fn parse_caption_tracks(
    video_id: &str,
    json: &serde_json::Value,
) -> std::result::Result<Vec<CaptionTrack>, ProviderError> {
    let status = json["playabilityStatus"]["status"].as_str().unwrap_or("OK");
    if status != "OK" {
        let reason = json["playabilityStatus"]["reason"]
            .as_str()
            .unwrap_or("no reason given");
        return Err(ProviderError::new(format!(
            "Video {} is unplayable ({}): {}",
            video_id, status, reason
        )));
    }

    let tracks = json["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .ok_or_else(|| {
            ProviderError::new(format!("Transcripts are disabled for video {}", video_id))
        })?;

    Ok(tracks
        .iter()
        .filter_map(|track| {
            Some(CaptionTrack {
                base_url: track["baseUrl"].as_str()?.to_string(),
                language_code: track["languageCode"].as_str()?.to_string(),
                generated: track["kind"].as_str() == Some("asr"),
            })
        })
        .collect())
}

/// Prefer a manually created track; fall back to the generated one.
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == language && !t.generated)
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.language_code == language && t.generated)
        })
}

/// The player hands out srv3 URLs; the plain timed-text format is what we parse.
fn timed_text_url(base_url: &str) -> std::result::Result<Url, ProviderError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ProviderError::new(format!("Invalid caption URL {}: {}", base_url, e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);

    Ok(url)
}

fn parse_timed_text(xml: &str) -> std::result::Result<Vec<Segment>, ProviderError> {
    let mut segments = Vec::new();

    for caps in text_element_regex().captures_iter(xml) {
        let raw = &caps[2];
        if raw.is_empty() {
            continue;
        }

        let mut start = None;
        let mut duration = 0.0;
        for attr in attribute_regex().captures_iter(&caps[1]) {
            let value = &attr[2];
            match &attr[1] {
                "start" => start = Some(parse_seconds(value)?),
                "dur" => duration = parse_seconds(value)?,
                _ => {}
            }
        }

        let start = start.ok_or_else(|| ProviderError::new("Caption element without start time"))?;

        // Text is XML-escaped HTML; unescape both layers and drop formatting tags.
        let xml_unescaped = unescape_entities(raw);
        let stripped = tag_regex().replace_all(&xml_unescaped, "");
        let text = unescape_entities(&stripped);

        segments.push(Segment::new(start, duration, text));
    }

    Ok(segments)
}

fn parse_seconds(value: &str) -> std::result::Result<f64, ProviderError> {
    value
        .parse::<f64>()
        .map_err(|_| ProviderError::new(format!("Invalid caption timing: {}", value)))
}

fn unescape_entities(input: &str) -> String {
    entity_regex()
        .replace_all(input, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded
                .map(|c| c.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("  dQw4w9WgXcQ "),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_video_url() {
        assert_eq!(
            video_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-test_key"});</script>"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSyA-test_key");

        let captcha = r#"<form><div class="g-recaptcha"></div></form>"#;
        let err = extract_api_key(captcha).unwrap_err();
        assert!(err.message.contains("Too Many Requests"));

        assert!(extract_api_key("<html></html>").is_err());
    }

    #[test]
    fn test_parse_caption_tracks() {
        let json = serde_json::json!({
            "playabilityStatus": {"status": "OK"},
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {"baseUrl": "https://example.com/a", "languageCode": "bn", "kind": "asr"},
                        {"baseUrl": "https://example.com/b", "languageCode": "en"},
                        {"languageCode": "fr"}
                    ]
                }
            }
        });

        let tracks = parse_caption_tracks("vid", &json).unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].generated);
        assert!(!tracks[1].generated);
    }

    #[test]
    fn test_parse_caption_tracks_errors() {
        let unplayable = serde_json::json!({
            "playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in"}
        });
        let err = parse_caption_tracks("vid", &unplayable).unwrap_err();
        assert!(err.message.contains("LOGIN_REQUIRED"));

        let disabled = serde_json::json!({"playabilityStatus": {"status": "OK"}});
        let err = parse_caption_tracks("vid", &disabled).unwrap_err();
        assert!(err.message.contains("disabled"));
    }

    #[test]
    fn test_select_track_prefers_manual() {
        let tracks = vec![
            CaptionTrack {
                base_url: "generated".to_string(),
                language_code: "bn".to_string(),
                generated: true,
            },
            CaptionTrack {
                base_url: "manual".to_string(),
                language_code: "bn".to_string(),
                generated: false,
            },
        ];

        assert_eq!(select_track(&tracks, "bn").unwrap().base_url, "manual");
        assert_eq!(select_track(&tracks[..1], "bn").unwrap().base_url, "generated");
        assert!(select_track(&tracks, "en").is_none());
    }

    #[test]
    fn test_timed_text_url_drops_format() {
        let url = timed_text_url("https://www.youtube.com/api/timedtext?v=abc&lang=bn&fmt=srv3").unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/api/timedtext?v=abc&lang=bn");
    }

    #[test]
    fn test_parse_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.16" dur="2.5">I&amp;#39;m <i>here</i></text>
<text start="2.66" dur="3">Tom &amp;amp; Jerry</text>
<text start="5.66" dur="1"></text>
<text start="6.66">no duration</text>
</transcript>"#;

        let segments = parse_timed_text(xml).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::new(0.16, 2.5, "I'm here"));
        assert_eq!(segments[1].text, "Tom & Jerry");
        assert_eq!(segments[2].duration, 0.0);
    }

    #[test]
    fn test_parse_timed_text_bad_timing() {
        let xml = r#"<transcript><text start="abc" dur="1">x</text></transcript>"#;
        assert!(parse_timed_text(xml).is_err());
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("a &lt;b&gt; &#2453; &#x41; &unknown;"), "a <b> ক A &unknown;");
    }
}
