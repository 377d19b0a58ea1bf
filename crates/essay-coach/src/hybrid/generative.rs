use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GenerativeConfig;

const CREDENTIAL_PREFIX: &str = "sk-";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("generative service credential is not configured")]
    Missing,
    #[error("generative service credential is malformed")]
    Malformed,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("generative service unavailable: {0}")]
    Unavailable(#[from] CredentialError),
    #[error("generative service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generative service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generative service returned no content")]
    EmptyResponse,
    #[error("generative response rejected: {0}")]
    Malformed(String),
}

/// Check that a credential is present and shaped like a secret key.
pub fn validate_credential(api_key: Option<&str>) -> Result<&str, CredentialError> {
    let key = api_key.map(str::trim).filter(|key| !key.is_empty());
    match key {
        None => Err(CredentialError::Missing),
        Some(key) if !key.starts_with(CREDENTIAL_PREFIX) => Err(CredentialError::Malformed),
        Some(key) => Ok(key),
    }
}

/// Prompt pair sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
}

/// Raw generator reply; `content` is expected to hold a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub content: String,
    pub model: String,
}

#[async_trait]
pub trait GenerativeEvaluator: Send + Sync {
    async fn evaluate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerativeError>;
}

/// Stands in for the generator when no usable credential exists; every call
/// fails so submissions take the fallback path.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableEvaluator {
    reason: CredentialError,
}

impl UnavailableEvaluator {
    pub fn new(reason: CredentialError) -> Self {
        Self { reason }
    }
}

#[async_trait]
impl GenerativeEvaluator for UnavailableEvaluator {
    async fn evaluate(&self, _request: &GenerationRequest) -> Result<GeneratedContent, GenerativeError> {
        Err(GenerativeError::Unavailable(self.reason))
    }
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiEvaluator {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiEvaluator {
    pub fn new(config: &GenerativeConfig, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }
}

/// Build the configured generator, or an [`UnavailableEvaluator`] when the
/// credential is missing or malformed. Only client construction can fail.
pub fn evaluator_from_config(
    config: &GenerativeConfig,
) -> Result<Arc<dyn GenerativeEvaluator>, reqwest::Error> {
    match validate_credential(config.api_key.as_deref()) {
        Ok(api_key) => Ok(Arc::new(OpenAiEvaluator::new(config, api_key)?)),
        Err(reason) => {
            warn!(%reason, "generative evaluation disabled; submissions will fall back");
            Ok(Arc::new(UnavailableEvaluator::new(reason)))
        }
    }
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
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerativeEvaluator for OpenAiEvaluator {
    async fn evaluate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerativeError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerativeError::EmptyResponse)?;

        let model = reply.model.unwrap_or_else(|| self.model.clone());
        info!(model = %model, chars = content.len(), "generative evaluation received");
        Ok(GeneratedContent { content, model })
    }
}
