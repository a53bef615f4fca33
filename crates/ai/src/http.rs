//! OpenAI-compatible chat-completions transport (OpenRouter, local Ollama).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::request::RecommendationRequest;
use crate::result::{RawRecommendation, ServiceError};
use crate::service::ReasoningService;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

const SYSTEM_PROMPT: &str = "You are a warehouse optimization expert. \
Select the optimal storage zone for the incoming item from the candidate zones only. \
Weigh operational efficiency (pick time, dispatch distance), rack compatibility and \
equipment availability, and honour the advisory constraints where possible. \
Answer with a single JSON object and nothing else: \
{\"zoneId\": string, \"confidence\": number between 0 and 1, \"reasoningText\": string}.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when present; never logged.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport-level ceiling; the client applies its own per-attempt timeout.
    pub request_timeout: Duration,
}

impl Default for ChatCompletionsConfig {
    fn default() -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            model: "mistralai/mistral-7b-instruct".to_string(),
            api_key: None,
            temperature: 0.3,
            max_tokens: 500,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatCompletionsService {
    http: reqwest::Client,
    config: ChatCompletionsConfig,
}

impl ChatCompletionsService {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::unavailable(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatCompletionsConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn body(&self, request: &RecommendationRequest) -> Result<serde_json::Value, ServiceError> {
        let payload = serde_json::to_string_pretty(request)
            .map_err(|e| ServiceError::malformed(format!("request encoding: {e}")))?;
        Ok(json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Put-away request:\n{payload}") },
            ],
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ReasoningService for ChatCompletionsService {
    fn describe(&self) -> String {
        format!("chat-completions:{}", self.config.model)
    }

    async fn complete(&self, request: &RecommendationRequest) -> Result<RawRecommendation, ServiceError> {
        let mut call = self.http.post(self.endpoint()).json(&self.body(request)?);
        if let Some(key) = &self.config.api_key {
            call = call.bearer_auth(key);
        }

        let response = call
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.request_timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::unavailable(format!("HTTP {status}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(format!("response body: {e}")))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ServiceError::malformed("empty completion"))?;

        debug!(model = %self.config.model, chars = content.len(), "completion received");
        parse_completion(&content)
    }
}

fn map_transport_error(err: reqwest::Error, timeout: Duration) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout {
            after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        ServiceError::unavailable(err.to_string())
    }
}

/// Extract the JSON object from a model's completion text.
///
/// Models often wrap the object in a fenced block or add a sentence around
/// it, so everything outside the outermost braces is ignored.
pub fn parse_completion(content: &str) -> Result<RawRecommendation, ServiceError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => return Err(ServiceError::malformed("no JSON object in completion")),
    };

    serde_json::from_str(json).map_err(|e| ServiceError::malformed(format!("completion JSON: {e}")))
}
