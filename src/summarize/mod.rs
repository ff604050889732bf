use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const USER_PREAMBLE: &str = "Please provide a concise summary of the following text:";

/// Failures while summarizing text through the language-model API.
///
/// Transient failures (rate limiting, server errors, transport faults) are
/// distinguished from permanent ones so a caller can add retry policy
/// without parsing message text. This client itself performs a single
/// attempt.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("language-model API is rate limiting requests (HTTP 429)")]
    RateLimited,

    #[error("language-model API is unavailable: HTTP {status}")]
    Service { status: u16 },

    #[error("language-model API rejected the request: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("language-model API returned no choices")]
    EmptyResponse,

    #[error("summarization request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OPENAI_API_KEY is not set; summarization requires it")]
    MissingCredentials,
}

impl SummarizeError {
    /// Whether a retry could plausibly succeed without changing the input.
    pub fn is_retryable(&self) -> bool {
        match self {
            SummarizeError::RateLimited | SummarizeError::Service { .. } => true,
            SummarizeError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Text summarization over an external language model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextSummarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the OpenAI chat-completions endpoint.
pub struct ChatSummarizer {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl ChatSummarizer {
    pub fn new(
        client: Client,
        api_base: String,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            api_base,
            api_key,
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl TextSummarizer for ChatSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(SummarizeError::MissingCredentials)?;

        tracing::info!("summarizing {} characters with {}", text.len(), self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": format!("{USER_PREAMBLE}\n\n{text}")},
                ],
                "max_tokens": self.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(SummarizeError::RateLimited);
            }
            if status.is_server_error() {
                return Err(SummarizeError::Service {
                    status: status.as_u16(),
                });
            }
            let message = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(SummarizeError::EmptyResponse)?;

        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_split() {
        assert!(SummarizeError::RateLimited.is_retryable());
        assert!(SummarizeError::Service { status: 503 }.is_retryable());
        assert!(!SummarizeError::EmptyResponse.is_retryable());
        assert!(!SummarizeError::MissingCredentials.is_retryable());
        assert!(!SummarizeError::Api {
            status: 400,
            message: "bad request".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_response_parsing_takes_first_choice() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[
                {"message":{"role":"assistant","content":"  first  "}},
                {"message":{"role":"assistant","content":"second"}}
            ]}"#,
        )
        .unwrap();

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap();
        assert_eq!(content.trim(), "first");
    }

    #[tokio::test]
    async fn test_missing_key_is_typed() {
        let summarizer = ChatSummarizer::new(
            Client::new(),
            "http://127.0.0.1:9".to_string(),
            None,
            "gpt-3.5-turbo".to_string(),
            150,
        );
        let result = summarizer.summarize("some text").await;
        assert!(matches!(result, Err(SummarizeError::MissingCredentials)));
    }
}
