//! Text-generation endpoint configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the local text-generation endpoint used for region lookup and
/// optimisation narratives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// When false every generation call is skipped and fallbacks are used
    #[serde(default = "default_llm_enabled")]
    pub enabled: bool,
    /// Full URL of the generate endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Model name sent with each request
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_llm_num_predict")]
    pub num_predict: u32,
    /// Request timeout in seconds; unset waits indefinitely
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_llm_enabled(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            num_predict: default_llm_num_predict(),
            timeout_seconds: None,
        }
    }
}

impl LlmConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Validate generation settings
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("Invalid LLM endpoint '{}': {}", self.endpoint, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "LLM endpoint must use http:// or https://, got: {}",
                url.scheme()
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "LLM temperature must be within [0, 2], got {}",
                self.temperature
            ));
        }
        if self.num_predict == 0 {
            return Err("LLM num_predict cannot be 0".to_string());
        }
        if self.timeout_seconds == Some(0) {
            return Err("LLM timeout cannot be 0".to_string());
        }
        Ok(())
    }
}
