use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client as OpenAiClient,
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the LLM client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub requests_per_minute: u32,
    /// Upper bound for a single call; each retry gets a fresh budget
    pub timeout_seconds: u64,
    /// Override for the provider endpoint (proxies, test servers)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: String::new(),
            max_tokens: 2048,
            temperature: 0.1,
            requests_per_minute: 10,
            timeout_seconds: 30,
            base_url: None,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Google Gemini with Google Search grounding
    Gemini,
    /// OpenAI chat completions (no search grounding, citations stay empty)
    OpenAI,
}

impl LlmProvider {
    /// Environment variable holding this provider's key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Key from the provider variable, falling back to `API_KEY`
    pub fn api_key_from_env(&self) -> Option<String> {
        [self.api_key_var(), "API_KEY"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Gemini => write!(f, "gemini"),
            LlmProvider::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAI),
            other => Err(format!("unknown provider '{}', expected gemini or openai", other)),
        }
    }
}

/// A single model call
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub model: String,
    pub prompt: String,
    pub web_search: bool,
}

impl LlmRequest {
    pub fn new(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            web_search: false,
        }
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// Grounding entry exactly as the provider reported it
///
/// Chunks that are not web results carry no `uri`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

impl RawCitation {
    pub fn web(title: &str, uri: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            uri: Some(uri.to_string()),
        }
    }
}

/// Response from the LLM with metadata
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub raw_response: String,
    pub citations: Vec<RawCitation>,
    pub model: String,
    pub tokens_used: Option<u32>,
    pub provider: LlmProvider,
}

/// Anything that can answer a prompt
///
/// The dashboard only talks to the model through this trait, which keeps
/// the network boundary swappable in tests.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

/// LLM client with rate limiting and a per-call timeout
///
/// Retrying is left to the caller so that a response which fails to parse
/// can be retried the same way as a transport failure.
pub struct LlmClient {
    http: reqwest::Client,
    openai_client: Option<OpenAiClient<OpenAIConfig>>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client from configuration
    ///
    /// # Arguments
    /// * `config` - LLM configuration, including the provider API key
    ///
    /// # Returns
    /// A client ready to make requests
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        tracing::info!(
            "Initializing LLM client: provider={:?}, rate_limit={}/min, timeout={}s",
            config.provider,
            config.requests_per_minute,
            config.timeout_seconds
        );

        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let openai_client = match config.provider {
            LlmProvider::OpenAI => {
                let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());
                if let Some(base_url) = &config.base_url {
                    openai_config = openai_config.with_api_base(base_url.clone());
                }
                Some(OpenAiClient::with_config(openai_config))
            }
            LlmProvider::Gemini => None,
        };

        let requests_per_minute = NonZeroU32::new(config.requests_per_minute)
            .ok_or_else(|| LlmError::Config("requests_per_minute must be > 0".to_string()))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(requests_per_minute)));

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!("LLM client initialized successfully");

        Ok(Self {
            http,
            openai_client,
            rate_limiter,
            config,
        })
    }

    async fn call_gemini(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let base_url = self.config.base_url.as_deref().unwrap_or(GEMINI_BASE_URL);
        let url = format!("{}/models/{}:generateContent", base_url, request.model);

        let body = GeminiRequest {
            contents: vec![GeminiContentRequest {
                role: "user",
                parts: vec![GeminiPartRequest {
                    text: &request.prompt,
                }],
            }],
            tools: if request.web_search {
                vec![GeminiTool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        tracing::debug!("Sending request to Gemini: {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => LlmError::RateLimited,
                401 | 403 => LlmError::Unauthorized,
                _ => LlmError::Api(format!("Status {}: {}", status, body)),
            });
        }

        let parsed: GeminiResponse = response.json().await?;
        gemini_to_response(parsed, &request.model)
    }

    async fn call_openai(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let client = self
            .openai_client
            .as_ref()
            .ok_or_else(|| LlmError::Config("OpenAI client not initialized".to_string()))?;

        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(openai_error)?
            .into();

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(request.model.as_str())
            .messages(vec![message])
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build()
            .map_err(openai_error)?;

        let response = client.chat().create(chat_request).await.map_err(openai_error)?;

        let response_text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(LlmError::EmptyResponse)?;

        Ok(LlmResponse {
            raw_response: response_text,
            citations: Vec::new(),
            model: response.model.clone(),
            tokens_used: response.usage.map(|u| u.total_tokens),
            provider: LlmProvider::OpenAI,
        })
    }
}

#[async_trait]
impl ModelInvoker for LlmClient {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(
            "Sending prompt to LLM (model: {}, length: {} chars, web_search: {})",
            request.model,
            request.prompt.len(),
            request.web_search
        );

        let call = async {
            match self.config.provider {
                LlmProvider::Gemini => self.call_gemini(&request).await,
                LlmProvider::OpenAI => self.call_openai(&request).await,
            }
        };

        let response = tokio::time::timeout(Duration::from_secs(self.config.timeout_seconds), call)
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout_seconds))??;

        tracing::info!(
            "LLM response received: model={}, tokens={:?}, length={} chars, citations={}",
            response.model,
            response.tokens_used,
            response.raw_response.len(),
            response.citations.len()
        );

        Ok(response)
    }
}

fn openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::Reqwest(e) => LlmError::Network(e.to_string()),
        other => LlmError::Api(format!("OpenAI API error: {}", other)),
    }
}

/// Flatten a Gemini reply into text plus grounding entries
///
/// Only the first candidate is used. A reply without any candidate is an
/// error; a candidate with no text yields an empty string and is left for
/// the parsers to judge.
fn gemini_to_response(response: GeminiResponse, model: &str) -> Result<LlmResponse, LlmError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let raw_response: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|m| {
            m.grounding_chunks
                .into_iter()
                .map(|chunk| match chunk.web {
                    Some(web) => RawCitation {
                        title: web.title,
                        uri: web.uri,
                    },
                    None => RawCitation::default(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        raw_response,
        citations,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        tokens_used: response.usage_metadata.and_then(|u| u.total_token_count),
        provider: LlmProvider::Gemini,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContentRequest<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContentRequest<'a> {
    role: &'static str,
    parts: Vec<GeminiPartRequest<'a>>,
}

#[derive(Serialize)]
struct GeminiPartRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    model_version: Option<String>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    total_token_count: Option<u32>,
}
