//! Benchmark and efficiency scorer
//!
//! No real peer spend exists, so peer costs and peer efficiency scores are
//! synthesised from a caller-supplied random source. Results are only
//! meaningful as ranges; pass a seeded RNG for reproducible output.

use crate::core::consumption::ConsumptionEstimate;
use crate::core::enhanced::EnhancedAnalysis;
use crate::core::models::Customer;
use crate::core::tables::{PercentileBands, ReferenceTables};
use crate::core::trace::CalculationTrace;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::debug;

/// Regional average used when a region has no benchmark entry
const FALLBACK_AVERAGE_EFFICIENCY: f64 = 0.65;

/// Assumed spread of regional efficiency scores
const EFFICIENCY_STD_DEV: f64 = 0.15;

/// Urgency of acting on a service's cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Benchmark result for one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEfficiency {
    pub current_cost: f64,
    pub benchmark_percentile: f64,
    pub optimization_potential: f64,
    pub priority: Priority,
}

/// A concrete optimisation suggestion for one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOpportunity {
    pub category: String,
    pub service: String,
    pub current_cost: f64,
    pub potential_savings: f64,
    pub implementation_difficulty: String,
    pub time_to_implement: String,
    pub description: String,
    pub action_items: Vec<String>,
}

/// Position of a lab's cost per product within the regional bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPosition {
    BelowP25,
    P25P50,
    P50P75,
    P75P90,
    AboveP90,
}

impl CostPosition {
    pub fn within(value: f64, bands: &PercentileBands) -> Self {
        if value < bands.p25 {
            Self::BelowP25
        } else if value < bands.p50 {
            Self::P25P50
        } else if value < bands.p75 {
            Self::P50P75
        } else if value < bands.p90 {
            Self::P75P90
        } else {
            Self::AboveP90
        }
    }
}

/// Cost per product of one licensed lab against regional bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabCostPositioning {
    pub lab: String,
    pub product_count: u32,
    pub lab_service_cost: f64,
    pub cost_per_product: f64,
    pub position: CostPosition,
    pub benchmarks: PercentileBands,
}

/// Output of the benchmark stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkAnalysis {
    /// Mean of `1 - percentile/100` over services, in [0, 1]
    pub overall_efficiency_score: f64,
    /// In [0, 100]
    pub regional_percentile: f64,
    pub is_top_performer: bool,
    pub service_efficiency_breakdown: BTreeMap<String, ServiceEfficiency>,
    pub cost_optimization_opportunities: Vec<OptimizationOpportunity>,
    pub lab_cost_positioning: Vec<LabCostPositioning>,
}

/// Share of `dataset` at or below `value`, as a percentage. 50 for an empty set.
pub fn percentile_rank(value: f64, dataset: &[f64]) -> f64 {
    if dataset.is_empty() {
        return 50.0;
    }
    let at_or_below = dataset.iter().filter(|&&v| v <= value).count();
    at_or_below as f64 / dataset.len() as f64 * 100.0
}

pub fn priority_level(percentile: f64, optimization_potential: f64) -> Priority {
    if percentile > 90.0 && optimization_potential > 0.3 {
        Priority::Critical
    } else if percentile > 75.0 && optimization_potential > 0.2 {
        Priority::High
    } else if percentile > 50.0 && optimization_potential > 0.1 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Mean per-service efficiency, 0.5 when there are no services
pub fn overall_efficiency_score(breakdown: &BTreeMap<String, ServiceEfficiency>) -> f64 {
    if breakdown.is_empty() {
        return 0.5;
    }
    let sum: f64 = breakdown
        .values()
        .map(|s| (1.0 - s.benchmark_percentile / 100.0).max(0.0))
        .sum();
    sum / breakdown.len() as f64
}

/// Normally distributed sample (Box-Muller) clamped to [0.01, 0.99]
pub fn normal_sample<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // 1 - [0, 1) keeps u away from zero
    let u = 1.0 - rng.gen_range(0.0..1.0);
    let v = 1.0 - rng.gen_range(0.0..1.0);
    let z = (-2.0 * f64::ln(u)).sqrt() * (2.0 * PI * v).cos();
    (z * std_dev + mean).clamp(0.01, 0.99)
}

/// Stand-in for a peer's monthly cost of one service: uniform in [50, 150)
/// per license
pub fn mock_peer_service_cost<R: Rng + ?Sized>(rng: &mut R, peer: &Customer) -> f64 {
    let base = rng.gen_range(0.0..1.0) * 100.0 + 50.0;
    base * peer.licenses.len().max(1) as f64
}

/// Scores a customer's service costs against synthetic regional peers
pub struct BenchmarkScorer<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> BenchmarkScorer<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// Percentile of `score` among synthetic peer scores for `region`.
    ///
    /// Without peers a four-bucket heuristic around the regional average is used.
    pub fn regional_percentile<R: Rng + ?Sized>(
        &self,
        score: f64,
        peer_count: usize,
        region: &str,
        rng: &mut R,
        trace: &mut CalculationTrace,
    ) -> f64 {
        trace.push(format!(
            "  - Step 5.1: Calculating regional percentile for efficiency score {:.3} in region {}",
            score, region
        ));
        let average = self
            .tables
            .regional_benchmarks
            .get(region)
            .map_or(FALLBACK_AVERAGE_EFFICIENCY, |b| b.average_efficiency_score);
        trace.push(format!(
            "    - Regional average efficiency: {:.3}, assumed std dev: {}",
            average, EFFICIENCY_STD_DEV
        ));

        if peer_count == 0 {
            trace.push("    - No regional peers found for comparison. Comparing to regional average.");
            let half = EFFICIENCY_STD_DEV * 0.5;
            let (percentile, note) = if score >= average + half {
                (75.0, "significantly above regional average. Assigning 75th percentile.")
            } else if score >= average {
                (60.0, "at or above regional average. Assigning 60th percentile.")
            } else if score < average - half {
                (25.0, "significantly below regional average. Assigning 25th percentile.")
            } else {
                (40.0, "somewhat below regional average. Assigning 40th percentile.")
            };
            trace.push(format!("    - Customer score {}", note));
            return percentile;
        }

        let mut scores: Vec<f64> = (0..peer_count)
            .map(|_| normal_sample(rng, average, EFFICIENCY_STD_DEV))
            .collect();
        trace.push(format!(
            "    - Generated {} mock peer efficiency scores for comparison.",
            scores.len()
        ));
        scores.push(score);

        let rank = scores.iter().filter(|&&s| s <= score).count();
        let percentile = rank as f64 / scores.len() as f64 * 100.0;
        trace.push(format!(
            "    - Customer's rank (scores <= {:.3}) is {} out of {}.",
            score,
            rank,
            scores.len()
        ));
        trace.push(format!(
            "    - Calculated regional percentile: {:.1}th",
            percentile
        ));
        percentile
    }

    fn optimization_potential(
        &self,
        customer: &Customer,
        service: &str,
        enhanced: &EnhancedAnalysis,
    ) -> f64 {
        enhanced.optimization_factor(service).unwrap_or_else(|| {
            customer
                .licenses
                .iter()
                .filter_map(|lab| self.tables.lab_profiles.get(lab))
                .find_map(|profile| profile.services.get(service))
                .map_or(0.0, |s| s.optimization_potential)
        })
    }

    fn opportunity_for(
        &self,
        service: &str,
        cost: f64,
        potential: f64,
    ) -> Option<OptimizationOpportunity> {
        let playbook = self.tables.optimization_playbook.get(service)?;
        Some(OptimizationOpportunity {
            category: playbook.category.clone(),
            service: service.to_string(),
            current_cost: cost,
            potential_savings: cost * potential,
            implementation_difficulty: playbook.difficulty.clone(),
            time_to_implement: playbook.time_to_implement.clone(),
            description: playbook.description.clone(),
            action_items: playbook.action_items.clone(),
        })
    }

    fn lab_positioning(
        &self,
        customer: &Customer,
        consumption: &ConsumptionEstimate,
    ) -> Vec<LabCostPositioning> {
        let Some(regional) = self.tables.regional_benchmarks.get(&customer.region) else {
            return Vec::new();
        };
        customer
            .licenses
            .iter()
            .filter_map(|lab| {
                let bands = regional.cost_per_product_benchmarks.get(lab)?;
                let product_count = consumption
                    .product_mappings
                    .values()
                    .filter(|assigned| *assigned == lab)
                    .count() as u32;
                if product_count == 0 {
                    return None;
                }
                let lab_service_cost: f64 = consumption
                    .lab_service_costs
                    .get(lab)
                    .map(|services| services.values().sum())
                    .unwrap_or(0.0);
                let cost_per_product = lab_service_cost / product_count as f64;
                Some(LabCostPositioning {
                    lab: lab.clone(),
                    product_count,
                    lab_service_cost,
                    cost_per_product,
                    position: CostPosition::within(cost_per_product, bands),
                    benchmarks: *bands,
                })
            })
            .collect()
    }

    /// Benchmark every service cost of `customer` against `regional_peers`
    /// (customers already filtered to the customer's region).
    #[allow(clippy::too_many_arguments)]
    pub fn analyze<R: Rng + ?Sized>(
        &self,
        customer: &Customer,
        consumption: &ConsumptionEstimate,
        regional_peers: &[Customer],
        enhanced: &EnhancedAnalysis,
        rng: &mut R,
        trace: &mut CalculationTrace,
    ) -> BenchmarkAnalysis {
        trace.push("Step 5: Performing regional benchmarking and efficiency analysis");

        let similar: Vec<&Customer> = regional_peers
            .iter()
            .filter(|peer| {
                peer.customer_type == customer.customer_type && peer.shares_license_with(customer)
            })
            .collect();

        let mut breakdown = BTreeMap::new();
        let mut opportunities = Vec::new();
        for (service, cost) in consumption.service_breakdown() {
            let peer_costs: Vec<f64> = similar
                .iter()
                .map(|peer| mock_peer_service_cost(rng, peer))
                .collect();
            let percentile = percentile_rank(cost, &peer_costs);
            let potential = self.optimization_potential(customer, &service, enhanced);

            if percentile > 75.0 || potential > 0.2 {
                opportunities.extend(self.opportunity_for(&service, cost, potential));
            }
            breakdown.insert(
                service,
                ServiceEfficiency {
                    current_cost: cost,
                    benchmark_percentile: percentile,
                    optimization_potential: potential,
                    priority: priority_level(percentile, potential),
                },
            );
        }

        let overall = overall_efficiency_score(&breakdown);
        let regional_percentile =
            self.regional_percentile(overall, regional_peers.len(), &customer.region, rng, trace);
        let is_top_performer = self
            .tables
            .regional_benchmarks
            .get(&customer.region)
            .is_some_and(|b| overall >= b.top_performer_threshold);

        trace.push(format!(
            "  - Overall efficiency score: {:.1}%",
            overall * 100.0
        ));
        trace.push(format!(
            "  - Regional percentile: {:.1}th percentile",
            regional_percentile
        ));
        trace.push(format!(
            "  - Identified {} optimization opportunities",
            opportunities.len()
        ));

        let lab_cost_positioning = self.lab_positioning(customer, consumption);
        for positioning in &lab_cost_positioning {
            trace.push(format!(
                "  - {} cost per product: ${:.2} ({:?})",
                positioning.lab, positioning.cost_per_product, positioning.position
            ));
        }
        debug!(
            overall,
            regional_percentile,
            similar = similar.len(),
            "Benchmark analysis complete"
        );

        BenchmarkAnalysis {
            overall_efficiency_score: overall,
            regional_percentile,
            is_top_performer,
            service_efficiency_breakdown: breakdown,
            cost_optimization_opportunities: opportunities,
            lab_cost_positioning,
        }
    }
}
