use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

pub use youtube::YoutubeCaptionClient;

use crate::video::VideoId;

/// A single timed caption fragment as returned by the captioning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Fragment text, whitespace-collapsed
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Fragment duration in seconds
    pub duration: f64,
}

/// Failures while retrieving a caption track.
#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    #[error("no caption track is available for video {0}")]
    NotFound(String),

    #[error("video {id} is not playable: {reason}")]
    InvalidVideo { id: String, reason: String },

    #[error("caption service request failed: {0}")]
    Service(#[from] reqwest::Error),

    #[error("caption service returned an unexpected payload: {0}")]
    Malformed(String),
}

/// Source of ordered caption entries for a video.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track for a video, in chronological order.
    async fn fetch(&self, id: &VideoId) -> Result<Vec<CaptionEntry>, CaptionError>;
}

/// Concatenate caption entries into one blob, order-preserving and
/// space-joined. Empty fragments are skipped.
pub fn join_entries(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, start: f64) -> CaptionEntry {
        CaptionEntry {
            text: text.to_string(),
            start,
            duration: 1.0,
        }
    }

    #[test]
    fn test_join_is_space_separated_and_ordered() {
        let entries = vec![entry("Hello", 0.0), entry("world", 1.0)];
        assert_eq!(join_entries(&entries), "Hello world");
    }

    #[test]
    fn test_join_preserves_sequence_order_not_timestamps() {
        // Order in the sequence wins even if timestamps disagree
        let entries = vec![entry("second", 5.0), entry("first", 0.0)];
        assert_eq!(join_entries(&entries), "second first");
    }

    #[test]
    fn test_join_skips_empty_fragments() {
        let entries = vec![entry("a", 0.0), entry("   ", 1.0), entry("b", 2.0)];
        assert_eq!(join_entries(&entries), "a b");
    }

    #[test]
    fn test_join_empty_track() {
        assert_eq!(join_entries(&[]), "");
    }
}
