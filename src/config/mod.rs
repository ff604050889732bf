use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI API settings
    pub openai: OpenAiConfig,

    /// Caption retrieval settings
    pub captions: CaptionConfig,

    /// Application settings
    pub app: AppConfig,

    /// API key read from the environment at startup. Never written to the
    /// config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL for the OpenAI-compatible API
    pub api_base: String,

    /// Model used for summarization
    pub summary_model: String,

    /// Model used for speech-to-text
    pub transcription_model: String,

    /// Generation cap for summaries
    pub max_summary_tokens: u32,

    /// Timeout applied to every outbound request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Caption languages in preference order
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for temporary audio files (system default if unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                summary_model: "gpt-3.5-turbo".to_string(),
                transcription_model: "whisper-1".to_string(),
                max_summary_tokens: 150,
                timeout_secs: 60,
            },
            captions: CaptionConfig {
                languages: vec!["en".to_string()],
            },
            app: AppConfig { temp_dir: None },
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from file or create default, then pick up the API
    /// key from the environment.
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            config
        } else {
            let config = Self::default();
            config.save().await?;
            config
        };

        config.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("tldw").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.openai.api_base.is_empty() {
            anyhow::bail!("openai.api_base must not be empty");
        }

        if self.openai.max_summary_tokens == 0 {
            anyhow::bail!("openai.max_summary_tokens must be greater than zero");
        }

        if self.openai.timeout_secs == 0 {
            anyhow::bail!("openai.timeout_secs must be greater than zero");
        }

        if self.captions.languages.is_empty() {
            anyhow::bail!("captions.languages must list at least one language");
        }

        Ok(())
    }

    /// The API key, or a typed error for flows that require it.
    pub fn require_api_key(&self) -> std::result::Result<&str, crate::TldwError> {
        self.api_key.as_deref().ok_or(crate::TldwError::MissingApiKey)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  API Base: {}", self.openai.api_base);
        println!("  Summary Model: {}", self.openai.summary_model);
        println!("  Transcription Model: {}", self.openai.transcription_model);
        println!("  Max Summary Tokens: {}", self.openai.max_summary_tokens);
        println!("  Request Timeout: {}s", self.openai.timeout_secs);
        println!("  Caption Languages: {}", self.captions.languages.join(", "));
        if let Some(dir) = &self.app.temp_dir {
            println!("  Temp Dir: {}", dir.display());
        }
        println!(
            "  API Key: {}",
            if self.api_key.is_some() { "set" } else { "not set" }
        );
    }
}
