//! Questionnaire analysis
//!
//! Turns the optional "extra information" answers into per-service cost
//! multipliers and optimisation factors. Answers are applied in a fixed order
//! because later answers scale earlier multipliers.

use crate::core::tables::ReferenceTables;
use crate::core::trace::CalculationTrace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers collected on the questionnaire step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancedAdditionalData {
    pub additional_notes: Option<String>,
    pub data_volume: Option<String>,
    pub peak_usage_hours: Option<String>,
    pub compliance_requirements: Option<Vec<String>>,
    pub current_cloud_usage: Option<String>,
    pub budget_constraints: Option<String>,
    pub performance_requirements: Option<String>,
    pub data_retention_period: Option<String>,
    pub geographic_distribution: Option<String>,
    pub integration_requirements: Option<String>,
    pub scalability_needs: Option<String>,
    pub security_requirements: Option<String>,
    pub backup_frequency: Option<String>,
    pub disaster_recovery_needs: Option<String>,
}

/// Result of questionnaire analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedAnalysis {
    pub cost_multipliers: BTreeMap<String, f64>,
    pub optimization_factors: BTreeMap<String, f64>,
    pub compliance_requirements: Vec<String>,
    pub usage_patterns: BTreeMap<String, String>,
}

impl EnhancedAnalysis {
    /// Multiplier for a service, 1.0 when the questionnaire said nothing about it
    pub fn cost_multiplier(&self, service: &str) -> f64 {
        self.cost_multipliers.get(service).copied().unwrap_or(1.0)
    }

    /// Questionnaire-derived optimisation potential for a service, if any
    pub fn optimization_factor(&self, service: &str) -> Option<f64> {
        self.optimization_factors
            .get(service)
            .copied()
            .filter(|f| *f > 0.0)
    }

    fn scale(&mut self, service: &str, factor: f64) {
        let current = self.cost_multiplier(service);
        self.cost_multipliers.insert(service.to_string(), current * factor);
    }
}

fn answered(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn data_volume_multiplier(answer: &str) -> f64 {
    match answer {
        "low" => 0.8,
        "medium" => 1.0,
        "high" => 1.5,
        "very-high" => 2.2,
        _ => 1.0,
    }
}

fn peak_usage_multiplier(answer: &str) -> f64 {
    match answer {
        "business-hours" => 0.9,
        "extended-hours" => 1.1,
        "round-the-clock" => 1.4,
        "batch-processing" => 0.7,
        _ => 1.0,
    }
}

fn performance_multiplier(answer: &str) -> f64 {
    match answer {
        "standard" => 1.0,
        "high" => 1.3,
        "critical" => 1.6,
        "basic" => 0.8,
        "advanced" => 1.2,
        "hpc" => 2.0,
        "ml-ai" => 2.5,
        _ => 1.0,
    }
}

fn retention_optimization(answer: &str) -> f64 {
    match answer {
        "1-year" => 0.3,
        "3-years" => 0.25,
        "5-years" => 0.2,
        "7-years" => 0.15,
        "10-years" => 0.1,
        "indefinite" => 0.05,
        _ => 0.2,
    }
}

fn cloud_usage_potential(answer: &str) -> f64 {
    match answer {
        "none" => 0.4,
        "aws-basic" => 0.3,
        "aws-advanced" => 0.15,
        "multi-cloud" => 0.25,
        "on-premise" => 0.35,
        "hybrid" => 0.2,
        _ => 0.25,
    }
}

fn budget_multiplier(answer: &str) -> f64 {
    match answer {
        "cost-optimized" => 0.85,
        "balanced" => 1.0,
        "performance-first" => 1.25,
        "enterprise" => 1.5,
        _ => 1.0,
    }
}

fn geographic_multiplier(answer: &str) -> f64 {
    match answer {
        "single-location" => 1.0,
        "regional" => 1.1,
        "national" => 1.3,
        "international" => 1.6,
        _ => 1.0,
    }
}

fn backup_multiplier(answer: &str) -> f64 {
    match answer {
        "daily" => 1.2,
        "real-time" => 2.0,
        "weekly" => 1.0,
        "monthly" => 0.8,
        "custom" => 1.1,
        _ => 1.0,
    }
}

fn scalability_multiplier(answer: &str) -> f64 {
    match answer {
        "stable" => 1.0,
        "moderate" => 1.15,
        "high" => 1.35,
        "rapid" => 1.6,
        _ => 1.0,
    }
}

/// Derive multipliers and optimisation factors from questionnaire answers
pub fn analyze_enhanced_data(
    data: Option<&EnhancedAdditionalData>,
    tables: &ReferenceTables,
    trace: &mut CalculationTrace,
) -> EnhancedAnalysis {
    trace.push("Step 1.5: Analyzing enhanced additional data for improved accuracy");

    let mut analysis = EnhancedAnalysis::default();
    let Some(data) = data else {
        trace.push("  - No enhanced data provided, using default multipliers");
        return analysis;
    };

    if let Some(volume) = answered(&data.data_volume) {
        let m = data_volume_multiplier(volume);
        analysis.cost_multipliers.insert("S3".to_string(), m);
        trace.push(format!("  - Data volume ({}) applied S3 cost multiplier: {}", volume, m));
    }

    if let Some(peak) = answered(&data.peak_usage_hours) {
        let m = peak_usage_multiplier(peak);
        analysis.cost_multipliers.insert("EC2".to_string(), m);
        analysis
            .usage_patterns
            .insert("peakHours".to_string(), peak.to_string());
        trace.push(format!("  - Peak usage ({}) applied EC2 cost multiplier: {}", peak, m));
    }

    if let Some(performance) = answered(&data.performance_requirements) {
        let m = performance_multiplier(performance);
        analysis.scale("EC2", m);
        analysis.cost_multipliers.insert("SageMaker".to_string(), m * 1.2);
        trace.push(format!(
            "  - Performance requirements ({}) applied compute multiplier: {}",
            performance, m
        ));
    }

    if let Some(retention) = answered(&data.data_retention_period) {
        let f = retention_optimization(retention);
        analysis.optimization_factors.insert("S3".to_string(), f);
        trace.push(format!(
            "  - Data retention ({}) provides S3 optimization potential: {:.0}%",
            retention,
            f * 100.0
        ));
    }

    if let Some(requirements) = &data.compliance_requirements {
        analysis
            .compliance_requirements
            .extend(requirements.iter().cloned());
        let m = 1.0 + requirements.len() as f64 * 0.1;
        analysis.cost_multipliers.insert("CloudWatch".to_string(), m);
        analysis.cost_multipliers.insert("CloudTrail".to_string(), m);
        trace.push(format!(
            "  - Compliance requirements ({}) applied monitoring multiplier: {}",
            requirements.join(", "),
            m
        ));
    }

    if let Some(usage) = answered(&data.current_cloud_usage) {
        let potential = cloud_usage_potential(usage);
        for profile in tables.lab_profiles.values() {
            for service in profile.services.keys() {
                analysis
                    .optimization_factors
                    .insert(service.clone(), potential);
            }
        }
        trace.push(format!(
            "  - Current cloud usage ({}) sets base optimization potential: {:.0}%",
            usage,
            potential * 100.0
        ));
    }

    if let Some(budget) = answered(&data.budget_constraints) {
        analysis
            .usage_patterns
            .insert("budgetPriority".to_string(), budget.to_string());
        let m = budget_multiplier(budget);
        for value in analysis.cost_multipliers.values_mut() {
            *value *= m;
        }
        trace.push(format!(
            "  - Budget constraints ({}) applied overall multiplier: {}",
            budget, m
        ));
    }

    if let Some(geography) = answered(&data.geographic_distribution) {
        let m = geographic_multiplier(geography);
        analysis.cost_multipliers.insert("CloudFront".to_string(), m);
        analysis.cost_multipliers.insert("DataTransfer".to_string(), m);
        trace.push(format!(
            "  - Geographic distribution ({}) applied distribution multiplier: {}",
            geography, m
        ));
    }

    if let Some(backup) = answered(&data.backup_frequency) {
        let m = backup_multiplier(backup);
        analysis.scale("S3", m);
        trace.push(format!(
            "  - Backup frequency ({}) applied storage multiplier: {}",
            backup, m
        ));
    }

    if let Some(scalability) = answered(&data.scalability_needs) {
        let m = scalability_multiplier(scalability);
        analysis.scale("EC2", m);
        analysis.scale("Lambda", m);
        trace.push(format!(
            "  - Scalability needs ({}) applied compute multiplier: {}",
            scalability, m
        ));
    }

    trace.push(format!(
        "  - Enhanced analysis complete. Applied {} cost multipliers and {} optimization factors",
        analysis.cost_multipliers.len(),
        analysis.optimization_factors.len()
    ));

    analysis
}
