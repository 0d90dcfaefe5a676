//! Inference gateway: the single external text-generation call per request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::InferenceSettings;
use crate::prompt::Prompt;
use crate::trace::TraceId;
use crate::validate::parse_json_loose;
use crate::{Error, Result};

/// Seam between the endpoints and the external provider. Tests substitute a
/// scripted implementation.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Whether an API key is available. Unconfigured gateways are rejected
    /// with failed-precondition before any call is attempted.
    fn is_configured(&self) -> bool;

    /// Run one non-streaming completion and return the raw model text.
    ///
    /// Every provider failure surfaces as [`Error::AiService`]; the detail is
    /// logged here with the trace id and never returned.
    async fn complete(&self, prompt: &Prompt, trace_id: &TraceId) -> Result<String>;
}

/// Fail with failed-precondition when no API key is available.
pub fn ensure_configured(gateway: &dyn InferenceGateway) -> Result<()> {
    if gateway.is_configured() {
        Ok(())
    } else {
        Err(Error::failed_precondition("AI service is not configured"))
    }
}

/// Complete `prompt` and loosely parse the output into a JSON object.
pub async fn infer_object(
    gateway: &dyn InferenceGateway,
    prompt: &Prompt,
    trace_id: &TraceId,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let raw = gateway.complete(prompt, trace_id).await?;
    Ok(parse_json_loose(&raw))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat Completions client (OpenAI-compatible).
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    client: Client,
    api_key: Option<String>,
    settings: InferenceSettings,
}

impl OpenAiGateway {
    /// Create a new gateway. A missing key yields an unconfigured gateway.
    pub fn new(settings: InferenceSettings, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    async fn call_api(&self, api_key: &str, prompt: &Prompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Internal("Empty response from inference provider".to_string()))
    }
}

#[async_trait]
impl InferenceGateway for OpenAiGateway {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &Prompt, trace_id: &TraceId) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::failed_precondition("AI service is not configured"))?;

        debug!(trace_id = %trace_id, model = %self.settings.model, "Calling inference provider");

        match self.call_api(api_key, prompt).await {
            Ok(text) => Ok(text),
            Err(err) => {
                match &err {
                    Error::Upstream { status, body } => error!(
                        trace_id = %trace_id,
                        status = *status,
                        body = %body,
                        "Inference provider returned an error"
                    ),
                    other => error!(
                        trace_id = %trace_id,
                        error = ?other,
                        "Inference call failed: {}",
                        other
                    ),
                }
                Err(Error::AiService)
            }
        }
    }
}
