//! OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` for the chat completions endpoint.

use std::time::Duration;

use advisor_core::{
    error::{AdvisoryError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key; `None` leaves the provider unconfigured
    pub api_key: Option<String>,

    /// Default model when the request does not name one
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key,
            model,
            base_url,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdvisoryError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env())
    }

    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, messages: &'a [Message], options: &'a GenerationOptions) -> ChatRequest<'a> {
        let model = if options.model.is_empty() {
            self.config.model.as_str()
        } else {
            options.model.as_str()
        };

        ChatRequest {
            model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }

    fn convert_completion(response: ChatResponse) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdvisoryError::Parse("response contained no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_wire),
        })
    }
}

/// Map a non-2xx status to the advisory error taxonomy
fn status_error(status: u16, body: String) -> AdvisoryError {
    match status {
        401 | 403 => AdvisoryError::Auth(format!("status={status}")),
        429 => AdvisoryError::RateLimited(body),
        _ => AdvisoryError::Http { status, body },
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "OpenAI".into(),
            default_model: self.config.model.clone(),
            configured: self.config.is_configured(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.is_configured())
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AdvisoryError::Config("OPENAI_API_KEY is not set".into()))?;

        let request = self.build_request(messages, options);
        tracing::debug!(model = request.model, messages = messages.len(), "sending chat completion");

        let res = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisoryError::ProviderUnavailable(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AdvisoryError::ProviderUnavailable(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "OpenAI request failed");
            return Err(status_error(status.as_u16(), text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        Self::convert_completion(parsed)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4");
        assert!(!config.is_configured());
    }

    #[test]
    fn request_uses_configured_model_when_unset() {
        let provider = OpenAiProvider::from_config(OpenAiConfig {
            model: "gpt-4o".into(),
            ..OpenAiConfig::default()
        })
        .unwrap();
        let messages = vec![Message::system("You are helpful."), Message::user("Hello")];
        let options = GenerationOptions::default().with_model("");

        let request = provider.build_request(&messages, &options);
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
    }

    #[test]
    fn response_conversion_takes_first_choice() {
        let body = r#"{
            "model": "gpt-4",
            "choices": [{"message": {"content": "{\"riskProfile\":\"growth\"}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let completion = OpenAiProvider::convert_completion(parsed).unwrap();

        assert_eq!(completion.content, "{\"riskProfile\":\"growth\"}");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn empty_choices_is_parse_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"model":"gpt-4","choices":[]}"#).unwrap();
        assert!(matches!(
            OpenAiProvider::convert_completion(parsed),
            Err(AdvisoryError::Parse(_))
        ));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_error(401, String::new()), AdvisoryError::Auth(_)));
        assert!(matches!(status_error(429, String::new()), AdvisoryError::RateLimited(_)));
        assert!(matches!(status_error(500, String::new()), AdvisoryError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let provider = OpenAiProvider::from_config(OpenAiConfig::default()).unwrap();
        let err = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AdvisoryError::Config(_)));
        assert!(!provider.health_check().await.unwrap());
    }
}
