//! Text-generation capability and its Ollama-compatible client

use crate::config::LlmConfig;
use crate::utils::error::{EstimatorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, info, warn};

/// Appended to every prompt sent to the endpoint
pub const JSON_ONLY_SUFFIX: &str =
    "\n\nRemember to respond ONLY with a valid JSON object and nothing else.";

/// Free-text generation from a prompt.
///
/// Implementations return the raw generated text; interpreting it is left to
/// the caller since the output is untrusted.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Identifier used in logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-style `/api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    num_predict: u32,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            EstimatorError::config(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        info!(model = %self.model, endpoint = %self.endpoint, "Calling text-generation endpoint");
        let request = GenerateRequest {
            model: &self.model,
            prompt: format!("{}{}", prompt, JSON_ONLY_SUFFIX),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Text-generation endpoint returned an error");
            return Err(EstimatorError::generation(format!(
                "Text-generation endpoint returned {}: {}",
                status, body
            )));
        }

        let body: GenerateResponse = response.json().await?;
        debug!(raw = %body.response, "Raw content from text generator");
        Ok(body.response)
    }
}

/// Generator used when `llm.enabled` is false; every call fails so callers
/// take their fallback path
#[derive(Debug, Clone, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(EstimatorError::generation("Text generation is disabled"))
    }
}

/// Generator that replays a fixed reply; useful for tests and offline runs
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    reply: String,
}

impl StaticGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    fn name(&self) -> &str {
        "static"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}
