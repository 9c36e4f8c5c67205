//! Configuration data models
//!
//! This module defines all configuration structures used by the service.

#![allow(missing_docs)]

pub mod estimator;
pub mod llm;
pub mod server;

pub use estimator::*;
pub use llm::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default maximum body size in bytes; three base64 spreadsheets share one body
pub fn default_max_body_size() -> usize {
    50 * 1024 * 1024
}

pub fn default_llm_enabled() -> bool {
    true
}

pub fn default_llm_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

pub fn default_llm_model() -> String {
    "llama3:8b".to_string()
}

pub fn default_llm_temperature() -> f32 {
    0.2
}

pub fn default_llm_num_predict() -> u32 {
    1000
}

pub fn default_region() -> String {
    "US West (N. California)".to_string()
}

pub fn default_inflation_rate() -> f64 {
    0.03
}

pub fn default_log_level() -> String {
    "info".to_string()
}
