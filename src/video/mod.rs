use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Matches `v=<id>` or `/<id>` where the id is an 11-character token of
/// letters, digits, underscore, or hyphen.
static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("hard-coded pattern is valid")
});

/// An 11-character video identifier as used by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the first video id from a URL-like string.
    ///
    /// Absence of an id is a valid outcome, not an error: malformed or
    /// unrelated input simply yields `None`.
    pub fn extract(input: &str) -> Option<VideoId> {
        VIDEO_ID_RE
            .captures(input.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| VideoId(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch-page URL for this id.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
