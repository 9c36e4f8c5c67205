//! Configuration management for the estimator
//!
//! This module handles loading, validation, and management of all service configuration.

pub mod models;

pub use models::*;

use crate::utils::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/labcost.yaml";

/// Main configuration struct for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Text-generation endpoint settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Pipeline settings
    #[serde(default)]
    pub estimator: EstimatorConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EstimatorError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| EstimatorError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `LABCOST_*` environment variable overrides
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LABCOST_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LABCOST_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| EstimatorError::Config(format!("Invalid port: {}", e)))?;
        }
        if let Some(endpoint) = lookup("LABCOST_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = lookup("LABCOST_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(enabled) = lookup("LABCOST_LLM_ENABLED") {
            self.llm.enabled = enabled.parse().map_err(|e| {
                EstimatorError::Config(format!("Invalid LABCOST_LLM_ENABLED flag: {}", e))
            })?;
        }
        if let Some(path) = lookup("LABCOST_TABLES_PATH") {
            self.estimator.tables_path = Some(path);
        }
        if let Some(seed) = lookup("LABCOST_BENCHMARK_SEED") {
            self.estimator.benchmark_seed = Some(
                seed.parse()
                    .map_err(|e| EstimatorError::Config(format!("Invalid benchmark seed: {}", e)))?,
            );
        }
        if let Some(level) = lookup("LABCOST_LOG_LEVEL") {
            self.logging.level = level;
        }

        self.validate()?;
        Ok(self)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get text-generation configuration
    pub fn llm(&self) -> &LlmConfig {
        &self.llm
    }

    /// Get estimator configuration
    pub fn estimator(&self) -> &EstimatorConfig {
        &self.estimator
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| EstimatorError::Config(format!("Server config error: {}", e)))?;

        self.server
            .cors
            .validate()
            .map_err(|e| EstimatorError::Config(format!("CORS config error: {}", e)))?;

        self.llm
            .validate()
            .map_err(|e| EstimatorError::Config(format!("LLM config error: {}", e)))?;

        self.estimator
            .validate()
            .map_err(|e| EstimatorError::Config(format!("Estimator config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| EstimatorError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
