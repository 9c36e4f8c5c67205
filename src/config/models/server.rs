//! HTTP listener settings

use super::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where and how the service listens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Actix worker count; unset uses one per core
    pub workers: Option<usize>,
    /// JSON body limit in bytes
    pub max_body_size: usize,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            max_body_size: default_max_body_size(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` as passed to `bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        match (self.port, self.max_body_size, self.workers) {
            (0, _, _) => Err("Port cannot be 0".to_string()),
            (_, 0, _) => Err("Max body size cannot be 0".to_string()),
            (_, _, Some(0)) => Err("Worker count cannot be 0".to_string()),
            _ => Ok(()),
        }
    }
}

/// Cross-origin settings for the browser front end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Origins allowed to call the API; empty or `*` admits any origin
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Preflight cache lifetime in seconds
    pub max_age: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            allowed_methods: ["GET", "POST", "OPTIONS"].map(String::from).to_vec(),
            allowed_headers: ["content-type", "x-requested-with"].map(String::from).to_vec(),
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    pub fn allows_all_origins(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Every listed origin must be `*` or a parseable URL
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.allows_all_origins() {
            warn!("CORS admits every origin");
        }
        match self
            .allowed_origins
            .iter()
            .find(|origin| *origin != "*" && url::Url::parse(origin).is_err())
        {
            Some(origin) => Err(format!("Invalid CORS origin: {}", origin)),
            None => Ok(()),
        }
    }
}
