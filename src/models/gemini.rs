use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::traits::LlmGateway;
use super::types::{
    ApiError, ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};
use crate::app::GeminiConfig;
use crate::constants::HTTP_CONNECT_TIMEOUT_SECS;
use crate::session::{Speaker, Turn};
use crate::utils::GatewayError;

/// Gemini role label for a transcript speaker.
///
/// This table is the only place provider role vocabulary appears.
pub(crate) fn wire_role(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "user",
        Speaker::Assistant => "model",
    }
}

/// Gateway backed by the Google Generative Language REST API
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model_name: String,
    api_key_env: String,
    timeout_secs: u64,
    generation_config: Option<GenerationConfig>,
    system_prompt: Option<String>,
}

impl GeminiGateway {
    /// Create a gateway from its configuration section.
    ///
    /// The credential is not read here; it is resolved on every call.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        let generation_config = if config.temperature.is_some() || config.max_output_tokens.is_some()
        {
            Some(GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            })
        } else {
            None
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_name: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            timeout_secs: config.timeout_secs,
            generation_config,
            system_prompt: config.system_prompt.clone(),
        })
    }

    fn resolve_api_key(&self) -> Result<String, GatewayError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GatewayError::Config(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }

    fn endpoint(&self) -> String {
        let model = self
            .model_name
            .strip_prefix("models/")
            .unwrap_or(&self.model_name);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Translate the transcript plus the new utterance into a request body
    pub(crate) fn build_request(&self, history: &[Turn], utterance: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(wire_role(turn.role())),
                parts: vec![Part {
                    text: turn.content().to_string(),
                }],
            })
            .collect();

        contents.push(Content {
            role: Some(wire_role(Speaker::User)),
            parts: vec![Part {
                text: utterance.to_string(),
            }],
        });

        GenerateContentRequest {
            contents,
            system_instruction: self.system_prompt.as_ref().map(|system| Content {
                role: None,
                parts: vec![Part {
                    text: system.clone(),
                }],
            }),
            generation_config: self.generation_config.clone(),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Transport(format!("request timed out after {}s", self.timeout_secs))
        } else {
            GatewayError::Transport(format!("failed to reach {}: {}", self.base_url, err))
        }
    }
}

/// Classify a non-2xx reply.
///
/// A rejected key is a credential problem, everything else means the service refused.
fn status_error(status: reqwest::StatusCode, raw: String) -> GatewayError {
    let api_error = serde_json::from_str::<ApiErrorEnvelope>(&raw)
        .ok()
        .map(|envelope| envelope.error);
    let credential_rejected = match status.as_u16() {
        401 | 403 => true,
        400 => api_error.as_ref().is_some_and(mentions_invalid_key),
        _ => false,
    };
    let detail = api_error.map(|err| err.message).unwrap_or(raw);
    let message = format!("HTTP {}: {}", status.as_u16(), detail);

    if credential_rejected {
        GatewayError::Config(message)
    } else {
        GatewayError::Transport(message)
    }
}

fn mentions_invalid_key(err: &ApiError) -> bool {
    let message = err.message.to_ascii_lowercase();
    message.contains("api key not valid")
        || message.contains("api_key_invalid")
        || err.status.as_deref() == Some("UNAUTHENTICATED")
}

/// Pull the reply text out of a decoded response body
fn extract_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
    if let Some(err) = response.error {
        return Err(GatewayError::Response(format!("API error: {}", err.message)));
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GatewayError::Response(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Response("no candidates in reply".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(GatewayError::Response(format!(
            "reply contained no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    async fn generate(&self, history: &[Turn], utterance: &str) -> Result<String, GatewayError> {
        let api_key = self.resolve_api_key()?;
        let body = self.build_request(history, utterance);

        debug!(model = %self.model_name, history = history.len(), "calling Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(status_error(status, raw));
        }

        let decoded: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| GatewayError::Response(format!("malformed reply: {}", e)))?;

        if let Some(usage) = &decoded.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count.unwrap_or(0),
                reply_tokens = usage.candidates_token_count.unwrap_or(0),
                total_tokens = usage.total_token_count.unwrap_or(0),
                "Gemini usage"
            );
        }

        extract_text(decoded)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
