//! tldw - "too long; didn't watch"
//!
//! This library turns a video URL into an AI-generated summary. Captions are
//! fetched from the hosting platform when available; otherwise the audio is
//! downloaded, normalized to WAV, and transcribed through a speech-to-text
//! API before summarization.

pub mod audio;
pub mod captions;
pub mod cli;
pub mod config;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod speech;
pub mod summarize;
pub mod utils;
pub mod video;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use pipeline::{Digest, Flow, SummaryFlow, SummaryPipeline, TranscriptSource, TranscriptText};
pub use video::VideoId;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, TldwError>;

/// Top-level error for the summary pipeline. Each stage reports its own
/// typed failure; this enum threads them through to the caller so control
/// flow never depends on inspecting message text.
#[derive(thiserror::Error, Debug)]
pub enum TldwError {
    #[error("no video id found in URL: {0}")]
    VideoIdNotFound(String),

    #[error(transparent)]
    Captions(#[from] captions::CaptionError),

    #[error(transparent)]
    Media(#[from] media::MediaError),

    #[error(transparent)]
    Transcription(#[from] speech::TranscriptionError),

    #[error(transparent)]
    Summarization(#[from] summarize::SummarizeError),

    #[error("OPENAI_API_KEY is not set; export it or add it to a .env file")]
    MissingApiKey,

    #[error("failed to construct HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("file operation failed: {0}")]
    Io(#[from] std::io::Error),
}
