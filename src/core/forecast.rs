//! Forecast projector
//!
//! Compounds a monthly cost over a horizon of months. Every factor uses a
//! fractional-year exponent, `rate^(month/12)`, so month 12 carries exactly one
//! year of each rate.

use crate::core::tables::{ReferenceTables, SizeProfile};
use crate::utils::error::{EstimatorError, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest accepted horizon in months
pub const MAX_HORIZON_MONTHS: u32 = 120;
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
pub const DEFAULT_SCENARIO: &str = "moderate";
pub const CUSTOM_SCENARIO: &str = "custom";

/// Named set of annual rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Annual business growth, applied as `(1 + rate)`
    pub growth_rate: f64,
    /// Annual usage base, applied directly
    pub usage_multiplier: f64,
    pub compliance_impact: f64,
    pub technology_adoption: f64,
}

/// User-supplied rates for the custom scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRates {
    pub growth_rate: f64,
    pub usage_multiplier: f64,
    pub compliance_impact: f64,
    pub technology_adoption: f64,
}

impl ForecastScenario {
    pub fn with_rates(&self, rates: CustomRates) -> Self {
        Self {
            growth_rate: rates.growth_rate,
            usage_multiplier: rates.usage_multiplier,
            compliance_impact: rates.compliance_impact,
            technology_adoption: rates.technology_adoption,
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        let bases = [
            1.0 + self.growth_rate,
            self.usage_multiplier,
            self.compliance_impact,
            self.technology_adoption,
        ];
        if bases.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(EstimatorError::validation(format!(
                "Scenario '{}' has a non-positive growth base",
                self.id
            )));
        }
        Ok(())
    }
}

/// One projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub month: u32,
    pub year: i32,
    /// Starting cost with inflation only
    pub base_cost: f64,
    pub projected_cost: f64,
    /// Product of every growth factor except inflation
    pub growth_factor: f64,
    pub cumulative_cost: f64,
    pub optimization_savings: f64,
    pub net_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub current_monthly_cost: f64,
    pub final_monthly_cost: f64,
    pub total_projected_cost: f64,
    /// Final month against the current cost, in percent
    pub projected_growth_percent: f64,
}

impl ForecastSummary {
    fn from_points(current: f64, points: &[ForecastPoint]) -> Self {
        let final_monthly_cost = points.last().map_or(0.0, |p| p.net_cost);
        let total_projected_cost = points.last().map_or(0.0, |p| p.cumulative_cost);
        let projected_growth_percent = if current > 0.0 && !points.is_empty() {
            (final_monthly_cost / current - 1.0) * 100.0
        } else {
            0.0
        };
        Self {
            current_monthly_cost: current,
            final_monthly_cost,
            total_projected_cost,
            projected_growth_percent,
        }
    }
}

/// Forecast of an existing customer's cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub scenario: ForecastScenario,
    pub months: u32,
    pub inflation_rate: f64,
    pub points: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastRequest {
    pub current_monthly_cost: f64,
    pub scenario: Option<String>,
    pub custom_scenario: Option<CustomRates>,
    pub months: Option<u32>,
    pub inflation_rate: Option<f64>,
    pub start_year: Option<i32>,
}

/// Prospective customer described on the new-customer form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProspectRequest {
    pub customer_name: String,
    pub customer_type: String,
    pub region: String,
    pub size_category: String,
    pub estimated_beds: Option<u32>,
    pub estimated_lab_types: Vec<String>,
    pub data_volume: String,
    pub compliance_requirements: Vec<String>,
    pub forecast_period: u32,
    pub start_year: Option<i32>,
}

impl Default for ProspectRequest {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            customer_type: "Hospital".to_string(),
            region: "US West (Oregon)".to_string(),
            size_category: "Medium".to_string(),
            estimated_beds: None,
            estimated_lab_types: Vec::new(),
            data_volume: "Medium".to_string(),
            compliance_requirements: Vec::new(),
            forecast_period: DEFAULT_HORIZON_MONTHS,
            start_year: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectForecast {
    pub customer_name: String,
    pub estimated_monthly_cost: f64,
    pub months: u32,
    pub points: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
}

/// Reject horizons outside `1..=120` months
pub fn validate_horizon(months: u32) -> Result<u32> {
    if (1..=MAX_HORIZON_MONTHS).contains(&months) {
        Ok(months)
    } else {
        Err(EstimatorError::validation(format!(
            "Forecast horizon must be between 1 and {} months, got {}",
            MAX_HORIZON_MONTHS, months
        )))
    }
}

fn year_fraction(month: u32) -> f64 {
    month as f64 / 12.0
}

fn calendar_year(start_year: i32, month: u32) -> i32 {
    start_year + ((month - 1) / 12) as i32
}

fn current_year() -> i32 {
    Utc::now().year()
}

/// Month-by-month projection of `current_cost` under `scenario`
pub fn project(
    current_cost: f64,
    scenario: &ForecastScenario,
    inflation_rate: f64,
    months: u32,
    start_year: i32,
) -> Vec<ForecastPoint> {
    let mut cumulative = 0.0;
    (1..=months)
        .map(|month| {
            let t = year_fraction(month);
            let growth = (1.0 + scenario.growth_rate).powf(t);
            let usage = scenario.usage_multiplier.powf(t);
            let compliance = scenario.compliance_impact.powf(t);
            let technology = scenario.technology_adoption.powf(t);
            let inflation = (1.0 + inflation_rate).powf(t);

            let base_cost = current_cost * inflation;
            let projected_cost = base_cost * growth * usage * compliance * technology;
            cumulative += projected_cost;

            ForecastPoint {
                month,
                year: calendar_year(start_year, month),
                base_cost,
                projected_cost,
                growth_factor: growth * usage * compliance * technology,
                cumulative_cost: cumulative,
                optimization_savings: 0.0,
                net_cost: projected_cost,
            }
        })
        .collect()
}

/// Builds forecasts from the reference scenarios
pub struct ForecastProjector<'a> {
    tables: &'a ReferenceTables,
    default_inflation: f64,
}

impl<'a> ForecastProjector<'a> {
    pub fn new(tables: &'a ReferenceTables, default_inflation: f64) -> Self {
        Self {
            tables,
            default_inflation,
        }
    }

    /// Scenario by id, with user rates applied to the custom scenario
    pub fn resolve_scenario(
        &self,
        id: &str,
        custom: Option<CustomRates>,
    ) -> Result<ForecastScenario> {
        let scenario = self
            .tables
            .scenario(id)
            .ok_or_else(|| EstimatorError::validation(format!("Unknown forecast scenario: {}", id)))?;
        let scenario = match custom {
            Some(rates) if id == CUSTOM_SCENARIO => scenario.with_rates(rates),
            _ => scenario.clone(),
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Forecast for an existing customer
    pub fn existing_customer(&self, request: &ForecastRequest) -> Result<Forecast> {
        let current = request.current_monthly_cost;
        if !current.is_finite() || current < 0.0 {
            return Err(EstimatorError::validation(
                "currentMonthlyCost must be a non-negative number",
            ));
        }
        let months = validate_horizon(request.months.unwrap_or(DEFAULT_HORIZON_MONTHS))?;
        let inflation_rate = request.inflation_rate.unwrap_or(self.default_inflation);
        if !(-1.0..=1.0).contains(&inflation_rate) {
            return Err(EstimatorError::validation(
                "inflationRate must be between -1 and 1",
            ));
        }
        let scenario = self.resolve_scenario(
            request.scenario.as_deref().unwrap_or(DEFAULT_SCENARIO),
            request.custom_scenario,
        )?;
        let start_year = request.start_year.unwrap_or_else(current_year);

        let points = project(current, &scenario, inflation_rate, months, start_year);
        let summary = ForecastSummary::from_points(current, &points);
        debug!(scenario = %scenario.id, months, final_cost = summary.final_monthly_cost, "Forecast computed");

        Ok(Forecast {
            scenario,
            months,
            inflation_rate,
            points,
            summary,
        })
    }

    /// Starting monthly cost of a prospective customer
    pub fn prospect_monthly_cost(&self, request: &ProspectRequest) -> Result<f64> {
        let tables = &self.tables.prospect;
        let size = self.size_profile(&request.size_category)?;

        let labs: f64 = request
            .estimated_lab_types
            .iter()
            .map(|lab| {
                tables
                    .lab_baseline_costs
                    .get(lab)
                    .copied()
                    .unwrap_or(tables.default_lab_baseline)
            })
            .sum();
        let region = tables
            .regional_multipliers
            .get(&request.region)
            .copied()
            .unwrap_or(1.0);
        let volume = tables
            .data_volume_multipliers
            .get(&request.data_volume)
            .copied()
            .unwrap_or(1.0);
        let compliance = 1.0
            + request.compliance_requirements.len() as f64
                * tables.compliance_overhead_per_requirement;

        let mut cost = labs * size.base * region * volume * compliance;
        if request.customer_type == "Hospital" {
            if let Some(beds) = request.estimated_beds.filter(|b| *b > 0) {
                cost *= (beds as f64 / 100.0 + 1.0).log10() + 0.5;
            }
        }
        Ok(cost)
    }

    fn size_profile(&self, category: &str) -> Result<SizeProfile> {
        self.tables
            .prospect
            .size_categories
            .get(category)
            .copied()
            .ok_or_else(|| EstimatorError::validation(format!("Unknown size category: {}", category)))
    }

    /// Forecast for a prospective customer
    pub fn new_customer(&self, request: &ProspectRequest) -> Result<ProspectForecast> {
        let months = validate_horizon(request.forecast_period)?;
        let estimated = self.prospect_monthly_cost(request)?;
        let size = self.size_profile(&request.size_category)?;
        let inflation_base = self.tables.prospect.inflation_base;
        let technology_base = self.tables.prospect.technology_adoption_base;
        let start_year = request.start_year.unwrap_or_else(current_year);

        let mut cumulative = 0.0;
        let points: Vec<ForecastPoint> = (1..=months)
            .map(|month| {
                let t = year_fraction(month);
                let growth = (1.0 + size.growth).powf(t);
                let usage = size.usage.powf(t);
                let inflation = inflation_base.powf(t);
                let technology = technology_base.powf(t);

                let projected_cost = estimated * growth * usage * inflation * technology;
                cumulative += projected_cost;

                ForecastPoint {
                    month,
                    year: calendar_year(start_year, month),
                    base_cost: estimated * inflation,
                    projected_cost,
                    growth_factor: growth * usage * technology,
                    cumulative_cost: cumulative,
                    optimization_savings: 0.0,
                    net_cost: projected_cost,
                }
            })
            .collect();
        let summary = ForecastSummary::from_points(estimated, &points);

        Ok(ProspectForecast {
            customer_name: request.customer_name.clone(),
            estimated_monthly_cost: estimated,
            months,
            points,
            summary,
        })
    }
}
