use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::captions::{self, CaptionError, CaptionSource, YoutubeCaptionClient};
use crate::config::Config;
use crate::media::{AudioSource, YtDlpDownloader};
use crate::speech::{SpeechToText, WhisperClient};
use crate::summarize::{ChatSummarizer, TextSummarizer};
use crate::video::VideoId;
use crate::{Result, TldwError};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    Captions,
    Speech,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::Speech => write!(f, "speech"),
        }
    }
}

/// A full transcript for one video.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptText {
    pub video_id: VideoId,
    pub source: TranscriptSource,
    pub text: String,
}

/// The summary artifact produced by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub video_id: VideoId,
    pub source: TranscriptSource,
    pub summary: String,
    pub generated_at: DateTime<Utc>,
}

/// A named composition of pipeline stages. New flows (quiz generation,
/// question answering) plug in as further implementations without touching
/// the existing stages.
#[async_trait]
pub trait Flow: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, url: &str) -> Result<Digest>;
}

/// The summary pipeline: id extraction, caption fetch with speech fallback,
/// summarization. Stages are trait objects so each one can be swapped or
/// stubbed independently.
pub struct SummaryPipeline {
    captions: Arc<dyn CaptionSource>,
    audio: Arc<dyn AudioSource>,
    speech: Arc<dyn SpeechToText>,
    summarizer: Arc<dyn TextSummarizer>,
    fallback_enabled: bool,
}

impl SummaryPipeline {
    pub fn new(
        captions: Arc<dyn CaptionSource>,
        audio: Arc<dyn AudioSource>,
        speech: Arc<dyn SpeechToText>,
        summarizer: Arc<dyn TextSummarizer>,
        fallback_enabled: bool,
    ) -> Self {
        Self {
            captions,
            audio,
            speech,
            summarizer,
            fallback_enabled,
        }
    }

    /// Build the production pipeline from configuration. The API key is
    /// carried inside the clients that need it; stages that never touch the
    /// paid APIs work without one.
    pub fn from_config(config: &Config, fallback_enabled: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai.timeout_secs))
            .build()
            .map_err(TldwError::HttpClient)?;

        let captions = YoutubeCaptionClient::new(client.clone(), config.captions.languages.clone());

        let speech = WhisperClient::new(
            client.clone(),
            config.openai.api_base.clone(),
            config.api_key.clone(),
            config.openai.transcription_model.clone(),
            config.app.temp_dir.clone(),
        );

        let summarizer = ChatSummarizer::new(
            client,
            config.openai.api_base.clone(),
            config.api_key.clone(),
            config.openai.summary_model.clone(),
            config.openai.max_summary_tokens,
        );

        Ok(Self::new(
            Arc::new(captions),
            Arc::new(YtDlpDownloader::new()),
            Arc::new(speech),
            Arc::new(summarizer),
            fallback_enabled,
        ))
    }

    /// Acquire a transcript for the video behind `url`.
    ///
    /// Captions are tried first. Only a missing caption track triggers the
    /// speech fallback; service failures propagate so an outage never
    /// silently costs a paid transcription call.
    pub async fn transcript(&self, url: &str) -> Result<TranscriptText> {
        let id = VideoId::extract(url).ok_or_else(|| TldwError::VideoIdNotFound(url.to_string()))?;

        match self.captions.fetch(&id).await {
            Ok(entries) => {
                tracing::info!("fetched {} caption entries for video {}", entries.len(), id);
                Ok(TranscriptText {
                    source: TranscriptSource::Captions,
                    text: captions::join_entries(&entries),
                    video_id: id,
                })
            }
            Err(CaptionError::NotFound(_)) if self.fallback_enabled => {
                tracing::info!("no captions for video {}, falling back to speech-to-text", id);
                let audio = self.audio.fetch_audio(&id).await?;
                let text = self.speech.transcribe(&audio).await?;
                Ok(TranscriptText {
                    source: TranscriptSource::Speech,
                    text,
                    video_id: id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Acquire a transcript and summarize it. A failed transcript
    /// short-circuits by `Result`; the summarizer is never invoked on
    /// failure.
    pub async fn summarize(&self, url: &str) -> Result<Digest> {
        let transcript = self.transcript(url).await?;
        tracing::debug!(
            "transcript preview: {}",
            crate::utils::preview(&transcript.text, 120)
        );

        let summary = self.summarizer.summarize(&transcript.text).await?;

        Ok(Digest {
            video_id: transcript.video_id,
            source: transcript.source,
            summary,
            generated_at: Utc::now(),
        })
    }
}

/// The one flow shipped today.
pub struct SummaryFlow {
    pipeline: SummaryPipeline,
}

impl SummaryFlow {
    pub fn new(pipeline: SummaryPipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Flow for SummaryFlow {
    fn name(&self) -> &'static str {
        "summary"
    }

    async fn run(&self, url: &str) -> Result<Digest> {
        self.pipeline.summarize(url).await
    }
}
