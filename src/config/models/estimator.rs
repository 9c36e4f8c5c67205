//! Estimator pipeline configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Pipeline-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// YAML file replacing the built-in reference tables
    #[serde(default)]
    pub tables_path: Option<String>,
    /// Fixed seed for peer synthesis; unset draws from OS entropy per request
    #[serde(default)]
    pub benchmark_seed: Option<u64>,
    /// Region assumed when the location lookup fails
    #[serde(default = "default_region")]
    pub default_region: String,
    /// Annual inflation applied to existing-customer forecasts
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            tables_path: None,
            benchmark_seed: None,
            default_region: default_region(),
            inflation_rate: default_inflation_rate(),
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_region.trim().is_empty() {
            return Err("Default region cannot be empty".to_string());
        }
        if !(-1.0..=1.0).contains(&self.inflation_rate) {
            return Err(format!(
                "Inflation rate must be within [-1, 1], got {}",
                self.inflation_rate
            ));
        }
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
