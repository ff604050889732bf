use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tldw",
    about = "tldw - Summarize videos from their transcripts using OpenAI",
    version,
    long_about = "Fetches a video's caption transcript, falls back to downloading and transcribing the audio when no captions exist, and produces a concise AI-generated summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the video behind a URL
    Summarize {
        /// Video URL (watch page, short link, or embed URL)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Do not fall back to audio transcription when captions are missing
        #[arg(long)]
        no_fallback: bool,
    },

    /// Fetch the transcript for a video without summarizing it
    Transcript {
        /// Video URL (watch page, short link, or embed URL)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Do not fall back to audio transcription when captions are missing
        #[arg(long)]
        no_fallback: bool,
    },

    /// Transcribe a local audio file through the speech-to-text API
    Transcribe {
        /// Path to an audio file (mp3, m4a, wav, ...)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
