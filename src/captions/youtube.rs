use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{CaptionEntry, CaptionError, CaptionSource};
use crate::video::VideoId;

const PLAYER_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/player";

/// Caption client for YouTube's innertube player API.
///
/// Resolves the caption track list for a video, picks a track by language
/// preference, and downloads it in the JSON timed-text format.
pub struct YoutubeCaptionClient {
    client: Client,
    languages: Vec<String>,
}

/// Timed-text payload (`fmt=json3`)
#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedEvent {
    #[serde(rename = "tStartMs")]
    start_ms: Option<u64>,

    #[serde(rename = "dDurationMs")]
    duration_ms: Option<u64>,

    segs: Option<Vec<TimedSegment>>,
}

#[derive(Debug, Deserialize)]
struct TimedSegment {
    utf8: Option<String>,
}

impl YoutubeCaptionClient {
    pub fn new(client: Client, languages: Vec<String>) -> Self {
        Self { client, languages }
    }

    /// Query the player API for the caption track list.
    async fn get_track_list(&self, id: &VideoId) -> Result<Value, CaptionError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "19.09.37",
                    "androidSdkVersion": 30,
                }
            },
            "videoId": id.as_str(),
        });

        let response = self
            .client
            .post(PLAYER_ENDPOINT)
            .query(&[("prettyPrint", "false")])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CaptionError::Malformed(format!(
                "player endpoint returned HTTP {}",
                response.status()
            )));
        }

        let info: Value = response.json().await?;

        let status = info["playabilityStatus"]["status"].as_str().unwrap_or("UNKNOWN");
        if status != "OK" {
            let reason = info["playabilityStatus"]["reason"]
                .as_str()
                .unwrap_or(status)
                .to_string();
            return Err(CaptionError::InvalidVideo {
                id: id.to_string(),
                reason,
            });
        }

        Ok(info)
    }

    /// Pick a caption track URL by language preference, falling back to the
    /// first listed track.
    fn select_track(&self, info: &Value, id: &VideoId) -> Result<String, CaptionError> {
        let tracks = info["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
            .as_array()
            .ok_or_else(|| CaptionError::NotFound(id.to_string()))?;

        if tracks.is_empty() {
            return Err(CaptionError::NotFound(id.to_string()));
        }

        let chosen = self
            .languages
            .iter()
            .find_map(|lang| {
                tracks.iter().find(|track| {
                    track["languageCode"]
                        .as_str()
                        .is_some_and(|code| code == lang || code.starts_with(&format!("{lang}-")))
                })
            })
            .unwrap_or(&tracks[0]);

        chosen["baseUrl"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CaptionError::Malformed("caption track has no baseUrl".to_string()))
    }

    /// Download a caption track and parse it into ordered entries.
    async fn fetch_track(&self, base_url: &str) -> Result<Vec<CaptionEntry>, CaptionError> {
        let mut track_url = Url::parse(base_url)
            .map_err(|e| CaptionError::Malformed(format!("invalid track URL: {e}")))?;
        track_url.query_pairs_mut().append_pair("fmt", "json3");

        let response = self.client.get(track_url).send().await?;

        if !response.status().is_success() {
            return Err(CaptionError::Malformed(format!(
                "caption track returned HTTP {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        let timed: TimedText = serde_json::from_str(&text)
            .map_err(|e| CaptionError::Malformed(format!("timed-text parse error: {e}")))?;

        Ok(parse_events(timed))
    }
}

/// Flatten timed-text events into caption entries, dropping layout-only
/// events (window definitions, bare newlines).
fn parse_events(timed: TimedText) -> Vec<CaptionEntry> {
    timed
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let raw: String = segs
                .into_iter()
                .filter_map(|seg| seg.utf8)
                .collect();
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(CaptionEntry {
                text,
                start: event.start_ms.unwrap_or(0) as f64 / 1000.0,
                duration: event.duration_ms.unwrap_or(0) as f64 / 1000.0,
            })
        })
        .collect()
}

#[async_trait]
impl CaptionSource for YoutubeCaptionClient {
    async fn fetch(&self, id: &VideoId) -> Result<Vec<CaptionEntry>, CaptionError> {
        tracing::debug!("resolving caption tracks for video {}", id);
        let info = self.get_track_list(id).await?;
        let track_url = self.select_track(&info, id)?;

        tracing::debug!("downloading caption track for video {}", id);
        let entries = self.fetch_track(&track_url).await?;

        if entries.is_empty() {
            return Err(CaptionError::NotFound(id.to_string()));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> YoutubeCaptionClient {
        YoutubeCaptionClient::new(Client::new(), vec!["en".to_string()])
    }

    #[test]
    fn test_parse_events_orders_and_collapses_whitespace() {
        let timed: TimedText = serde_json::from_str(
            r#"{"events":[
                {"tStartMs":0,"dDurationMs":1500,"segs":[{"utf8":"Hello"}]},
                {"tStartMs":1500,"segs":[{"utf8":"wor"},{"utf8":"ld\n"}]}
            ]}"#,
        )
        .unwrap();

        let entries = parse_events(timed);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Hello");
        assert_eq!(entries[0].start, 0.0);
        assert_eq!(entries[0].duration, 1.5);
        assert_eq!(entries[1].text, "world");
    }

    #[test]
    fn test_parse_events_drops_layout_events() {
        let timed: TimedText = serde_json::from_str(
            r#"{"events":[
                {"tStartMs":0,"dDurationMs":100},
                {"tStartMs":0,"segs":[{"utf8":"\n"}]},
                {"tStartMs":200,"segs":[{"utf8":"text"}]}
            ]}"#,
        )
        .unwrap();

        let entries = parse_events(timed);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "text");
    }

    #[test]
    fn test_select_track_prefers_language() {
        let info = json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://example.com/de", "languageCode": "de"},
                {"baseUrl": "https://example.com/en", "languageCode": "en"}
            ]}}
        });

        let id = VideoId::extract("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let url = client().select_track(&info, &id).unwrap();
        assert_eq!(url, "https://example.com/en");
    }

    #[test]
    fn test_select_track_falls_back_to_first() {
        let info = json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://example.com/ja", "languageCode": "ja"}
            ]}}
        });

        let id = VideoId::extract("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let url = client().select_track(&info, &id).unwrap();
        assert_eq!(url, "https://example.com/ja");
    }

    #[test]
    fn test_select_track_missing_is_not_found() {
        let info = json!({"captions": {}});
        let id = VideoId::extract("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert!(matches!(
            client().select_track(&info, &id),
            Err(CaptionError::NotFound(_))
        ));
    }
}
