//! Reference tables
//!
//! Every static lookup the pipeline consults lives here: consumption profiles,
//! regional multipliers and benchmarks, keyword rules, pricing and forecast
//! tables. Tables are loaded once at start-up and shared behind an `Arc`.

use crate::core::forecast::ForecastScenario;
use crate::utils::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

const BUILTIN_TABLES: &str = include_str!("builtin.yaml");

/// Benchmark usage levels for a single service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageBenchmarks {
    pub low: f64,
    pub median: f64,
    pub high: f64,
    pub optimal: f64,
}

/// Baseline consumption of one cloud service by one lab category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProfile {
    pub base_units: f64,
    pub cost_per_product: f64,
    pub utilization_factor: f64,
    pub benchmarks: UsageBenchmarks,
    pub optimization_potential: f64,
}

/// A lab-level efficiency indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetric {
    pub current: f64,
    pub optimal: f64,
    pub impact: String,
}

/// Consumption profile for one lab category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabProfile {
    pub services: BTreeMap<String, ServiceProfile>,
    #[serde(default)]
    pub efficiency_metrics: BTreeMap<String, EfficiencyMetric>,
}

/// Cost-per-product percentile bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBands {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Efficiency benchmark for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalBenchmark {
    pub average_efficiency_score: f64,
    pub top_performer_threshold: f64,
    pub cost_per_product_benchmarks: BTreeMap<String, PercentileBands>,
}

/// Maps a product keyword to the services the product consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeRule {
    pub keyword: String,
    pub primary_services: Vec<String>,
    pub compute_intensity: String,
    pub storage_intensity: String,
    pub cost_multiplier: f64,
}

/// Maps a product keyword to a lab category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabRule {
    pub keyword: String,
    pub lab: String,
}

/// Alternative spellings of a region label in uploaded cost tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionVariants {
    pub standard: String,
    pub variants: Vec<String>,
}

/// Canned optimisation advice for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePlaybook {
    pub category: String,
    pub description: String,
    pub difficulty: String,
    pub time_to_implement: String,
    pub action_items: Vec<String>,
}

/// Flat monthly pricing for a project type in a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPricing {
    pub base_cost: f64,
    pub cost_per_user: f64,
}

/// Size category parameters for prospective customers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeProfile {
    pub base: f64,
    pub growth: f64,
    pub usage: f64,
}

/// Tables used to forecast a prospective customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectTables {
    pub lab_baseline_costs: BTreeMap<String, f64>,
    pub default_lab_baseline: f64,
    pub regional_multipliers: BTreeMap<String, f64>,
    pub size_categories: BTreeMap<String, SizeProfile>,
    pub data_volume_multipliers: BTreeMap<String, f64>,
    pub compliance_overhead_per_requirement: f64,
    pub inflation_base: f64,
    pub technology_adoption_base: f64,
}

/// All static reference data consulted by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTables {
    pub lab_profiles: BTreeMap<String, LabProfile>,
    pub regional_benchmarks: BTreeMap<String, RegionalBenchmark>,
    pub regional_multipliers: BTreeMap<String, BTreeMap<String, f64>>,
    pub product_types: Vec<ProductTypeRule>,
    pub default_product_type: String,
    pub lab_rules: Vec<LabRule>,
    pub region_variants: Vec<RegionVariants>,
    pub fallback_region: String,
    pub customer_type_scaling: BTreeMap<String, f64>,
    pub optimization_playbook: BTreeMap<String, ServicePlaybook>,
    pub project_pricing: BTreeMap<String, BTreeMap<String, ProjectPricing>>,
    pub forecast_scenarios: Vec<ForecastScenario>,
    pub prospect: ProspectTables,
}

impl ReferenceTables {
    /// Tables compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_TABLES)
    }

    /// Load replacement tables from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading reference tables from: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| {
            EstimatorError::Config(format!("Failed to read reference tables: {}", e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse tables from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let tables: Self = serde_yaml::from_str(content)
            .map_err(|e| EstimatorError::Config(format!("Invalid reference tables: {}", e)))?;
        tables.validate()?;
        debug!(
            labs = tables.lab_profiles.len(),
            regions = tables.regional_multipliers.len(),
            "Reference tables loaded"
        );
        Ok(tables)
    }

    /// Load from `path` when given, otherwise the built-in tables
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.lab_profiles.is_empty() {
            return Err(EstimatorError::config("Reference tables define no lab profiles"));
        }
        if !self
            .product_types
            .iter()
            .any(|rule| rule.keyword == self.default_product_type)
        {
            return Err(EstimatorError::config(format!(
                "Default product type '{}' has no rule",
                self.default_product_type
            )));
        }
        for rule in &self.lab_rules {
            if !self.lab_profiles.contains_key(&rule.lab) {
                return Err(EstimatorError::config(format!(
                    "Keyword '{}' maps to unknown lab '{}'",
                    rule.keyword, rule.lab
                )));
            }
        }
        Ok(())
    }

    /// Regional multiplier for a service, 1.0 when either is unknown
    pub fn regional_multiplier(&self, region: &str, service: &str) -> f64 {
        self.regional_multipliers
            .get(region)
            .and_then(|services| services.get(service))
            .copied()
            .unwrap_or(1.0)
    }

    /// Scaling factor for a customer type, 1.0 when unknown
    pub fn customer_type_scaling(&self, customer_type: &str) -> f64 {
        self.customer_type_scaling
            .get(customer_type)
            .copied()
            .unwrap_or(1.0)
    }

    /// Product-type rule by keyword
    pub fn product_type(&self, keyword: &str) -> Option<&ProductTypeRule> {
        self.product_types.iter().find(|rule| rule.keyword == keyword)
    }

    /// Scenario by id
    pub fn scenario(&self, id: &str) -> Option<&ForecastScenario> {
        self.forecast_scenarios.iter().find(|s| s.id == id)
    }

    /// Canonical lab category names
    pub fn lab_names(&self) -> impl Iterator<Item = &str> {
        self.lab_profiles.keys().map(String::as_str)
    }
}
