use async_trait::async_trait;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use uuid::Uuid;

use crate::video::VideoId;

/// Failures while acquiring a video's audio stream.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("yt-dlp is not available; install it to enable the speech fallback: https://github.com/yt-dlp/yt-dlp")]
    ToolMissing,

    #[error("audio download failed: {0}")]
    DownloadFailed(String),

    #[error("audio file handling failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of raw audio bytes for a video.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch_audio(&self, id: &VideoId) -> Result<Vec<u8>, MediaError>;
}

/// Audio downloader shelling out to yt-dlp.
///
/// Downloads the lowest-quality audio stream, which is plenty for
/// speech-to-text, into a scoped temporary directory that is removed when
/// the call returns.
pub struct YtDlpDownloader {
    yt_dlp_path: String,
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl AudioSource for YtDlpDownloader {
    async fn fetch_audio(&self, id: &VideoId) -> Result<Vec<u8>, MediaError> {
        if !self.check_availability().await {
            return Err(MediaError::ToolMissing);
        }

        let staging = TempDir::new()?;
        let filename = format!("audio_{}.mp3", &Uuid::new_v4().to_string()[..8]);
        let output_path = staging.path().join(filename);

        tracing::debug!("downloading audio for video {} to {}", id, output_path.display());

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &output_path.to_string_lossy(),
                "--extract-audio",
                "--audio-format",
                "mp3",
                // Lowest quality is still good for transcription
                "--audio-quality",
                "9",
                "--format",
                "worstaudio[acodec^=mp4a]/worstaudio[ext=m4a]/worstaudio[ext=mp3]/worstaudio",
                "--no-playlist",
                &id.watch_url(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::DownloadFailed(error.trim().to_string()));
        }

        let bytes = fs_err::read(&output_path)?;
        tracing::debug!("downloaded {} bytes of audio for video {}", bytes.len(), id);

        Ok(bytes)
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}
