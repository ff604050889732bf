use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;

use crate::audio::{self, AudioError};

/// Failures while transcribing audio through the speech-to-text API.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("speech-to-text API rejected the request: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("speech-to-text request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OPENAI_API_KEY is not set; transcription requires it")]
    MissingCredentials,

    #[error("temporary audio file handling failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Speech-to-text over an arbitrary audio byte stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError>;
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Client for the OpenAI audio transcription endpoint.
pub struct WhisperClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temp_dir: Option<PathBuf>,
}

impl WhisperClient {
    pub fn new(
        client: Client,
        api_base: String,
        api_key: Option<String>,
        model: String,
        temp_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            client,
            api_base,
            api_key,
            model,
            temp_dir,
        }
    }

    /// Build a standalone client from configuration, for transcribing local
    /// files outside the URL pipeline.
    pub fn from_config(config: &crate::config::Config) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.openai.timeout_secs))
            .build()
            .map_err(crate::TldwError::HttpClient)?;

        Ok(Self::new(
            client,
            config.openai.api_base.clone(),
            config.api_key.clone(),
            config.openai.transcription_model.clone(),
            config.app.temp_dir.clone(),
        ))
    }

    async fn request_transcription(
        &self,
        key: &str,
        wav_path: &std::path::Path,
    ) -> Result<String, TranscriptionError> {
        // Submit the persisted file, not the in-memory buffer
        let bytes = fs_err::read(wav_path)?;

        let part = multipart::Part::bytes(bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Api {
                status,
                message: message.trim().to_string(),
            });
        }

        let parsed: WhisperResponse = response.json().await?;
        Ok(parsed.text)
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    /// Normalize the audio to WAV, persist it to a uniquely named temp file,
    /// and submit that file for transcription. The temp file is removed on
    /// every exit path when its guard drops.
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(TranscriptionError::MissingCredentials)?;

        tracing::info!("normalizing {} bytes of audio to wav", audio.len());
        let wav = audio::normalize_to_wav(audio)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("tldw_audio_").suffix(".wav");
        let temp_file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }?;
        fs_err::write(temp_file.path(), &wav)?;

        tracing::info!("transcribing audio file {}", temp_file.path().display());
        self.request_transcription(key, temp_file.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn tiny_wav() -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..160i16 {
                writer.write_sample(i * 10).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn unreachable_client(temp_dir: PathBuf) -> WhisperClient {
        let http = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        WhisperClient::new(
            http,
            // Nothing listens here; the request fails fast
            "http://127.0.0.1:9".to_string(),
            Some("test-key".to_string()),
            "whisper-1".to_string(),
            Some(temp_dir),
        )
    }

    #[tokio::test]
    async fn test_temp_file_removed_after_api_failure() {
        let staging = tempfile::TempDir::new().unwrap();
        let client = unreachable_client(staging.path().to_path_buf());

        let result = client.transcribe(&tiny_wav()).await;
        assert!(matches!(result, Err(TranscriptionError::Http(_))));

        let leftover = std::fs::read_dir(staging.path()).unwrap().count();
        assert_eq!(leftover, 0, "temp wav must not outlive the call");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_io() {
        let staging = tempfile::TempDir::new().unwrap();
        let client = WhisperClient::new(
            Client::new(),
            "http://127.0.0.1:9".to_string(),
            None,
            "whisper-1".to_string(),
            Some(staging.path().to_path_buf()),
        );

        let result = client.transcribe(&tiny_wav()).await;
        assert!(matches!(result, Err(TranscriptionError::MissingCredentials)));
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_audio_is_a_typed_failure() {
        let staging = tempfile::TempDir::new().unwrap();
        let client = unreachable_client(staging.path().to_path_buf());

        let result = client.transcribe(&[0u8; 16]).await;
        assert!(matches!(
            result,
            Err(TranscriptionError::Audio(AudioError::UnsupportedFormat(_)))
        ));
    }
}
