//! Cost allocation pipeline
//!
//! Runs every stage for one allocation request, in order, threading a single
//! calculation trace through all of them. Only request validation and the
//! regional table lookup can fail; every other stage degrades to defaults.

use crate::core::allocation::{AllocationResult, allocate};
use crate::core::benchmark::{BenchmarkAnalysis, BenchmarkScorer};
use crate::core::classifier::ProductClassifier;
use crate::core::consumption::ConsumptionModel;
use crate::core::enhanced::{EnhancedAdditionalData, analyze_enhanced_data};
use crate::core::location::{LocationQuery, resolve_location};
use crate::core::models::{Customer, CustomerType, DEFAULT_SIZE};
use crate::core::products::{ProductCostSummary, summarize_products};
use crate::core::recommendations::{
    FallbackRecommender, OptimizationRecommendations, RecommendationContext, TextGenerator,
};
use crate::core::regional::regional_cost_metrics;
use crate::core::spreadsheet::{Row, parse_customer_list, parse_rows};
use crate::core::tables::ReferenceTables;
use crate::core::trace::CalculationTrace;
use crate::utils::business::{format_usd, parse_digits};
use crate::utils::error::{EstimatorError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

const MISSING_FIELDS: &str = "Missing required fields: customerName, customerCountry, regionalCostBreakdownData, productCostData, customerListData";
const INVALID_LICENSES: &str =
    "Missing or invalid required field: customerLicenses (must be a non-empty array of license names)";
const SUCCESS_MESSAGE: &str =
    "Enhanced cost calculation with optimization recommendations completed successfully.";

/// Bed count sent either as a number or as text
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Some(Value::String(s)) => parse_digits(&s).unwrap_or(0),
        _ => 0,
    })
}

/// Body of an allocation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationRequest {
    pub customer_name: Option<String>,
    pub customer_country: Option<String>,
    pub customer_city_state: Option<String>,
    /// Kept loose so a malformed value is reported as a validation error
    pub customer_licenses: Option<Value>,
    pub regional_cost_breakdown_data: Option<String>,
    pub product_cost_data: Option<String>,
    pub customer_list_data: Option<String>,
    pub additional_notes: Option<String>,
    pub enhanced_additional_data: Option<EnhancedAdditionalData>,
    pub customer_type: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub customer_beds: u32,
    pub customer_size: Option<String>,
}

/// Request fields after validation
#[derive(Debug, Clone)]
struct ValidRequest<'a> {
    name: &'a str,
    country: &'a str,
    licenses: Vec<String>,
    regional: &'a str,
    products: &'a str,
    customers: &'a str,
    customer_type: CustomerType,
    size: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl AllocationRequest {
    fn validate(&self) -> Result<ValidRequest<'_>> {
        let (Some(name), Some(country), Some(regional), Some(products), Some(customers)) = (
            non_empty(&self.customer_name),
            non_empty(&self.customer_country),
            non_empty(&self.regional_cost_breakdown_data),
            non_empty(&self.product_cost_data),
            non_empty(&self.customer_list_data),
        ) else {
            return Err(EstimatorError::validation(MISSING_FIELDS));
        };

        let licenses: Vec<String> = match &self.customer_licenses {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::trim)
                        .filter(|license| !license.is_empty())
                        .map(str::to_string)
                })
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| EstimatorError::validation(INVALID_LICENSES))?,
            _ => return Err(EstimatorError::validation(INVALID_LICENSES)),
        };

        Ok(ValidRequest {
            name,
            country,
            licenses,
            regional,
            products,
            customers,
            customer_type: self
                .customer_type
                .as_deref()
                .map(CustomerType::from)
                .unwrap_or(CustomerType::Other),
            size: non_empty(&self.customer_size)
                .unwrap_or(DEFAULT_SIZE)
                .to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub reporting_period: String,
    #[serde(rename = "specificRegionTotalAWSCost")]
    pub specific_region_total_aws_cost: f64,
    pub regional_cost_ratio: f64,
    pub customer_proportion_of_group: f64,
    pub input_customer_total_product_cost: f64,
    pub final_cost: f64,
}

/// Successful allocation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub customer_name: String,
    pub customer_location: String,
    pub closest_region: String,
    pub key_metrics: KeyMetrics,
    pub highlighted_final_cost: String,
    pub customer_licenses: Vec<String>,
    pub customer_type: CustomerType,
    pub service_breakdown: BTreeMap<String, f64>,
    pub product_mappings: BTreeMap<String, String>,
    pub product_cost_summary: ProductCostSummary,
    pub allocation: AllocationResult,
    pub benchmark_analysis: BenchmarkAnalysis,
    pub optimization_recommendations: OptimizationRecommendations,
    pub calculation_steps: CalculationTrace,
    pub message: String,
}

/// A failed run with the trace accumulated up to the failure
#[derive(Debug)]
pub struct PipelineFailure {
    pub error: EstimatorError,
    pub trace: CalculationTrace,
}

/// Body returned with a 500 from the allocation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineErrorBody {
    pub error: String,
    pub stack: Option<String>,
    pub calculation_steps: CalculationTrace,
}

impl PipelineFailure {
    fn new(error: EstimatorError, mut trace: CalculationTrace) -> Self {
        trace.push(format!("API Error: {}", error));
        Self { error, trace }
    }

    pub fn is_client_error(&self) -> bool {
        self.error.is_client_error()
    }

    pub fn into_body(self) -> PipelineErrorBody {
        PipelineErrorBody {
            error: self.error.to_string(),
            stack: Some(self.error.chain_report()),
            calculation_steps: self.trace,
        }
    }
}

fn rows_or_empty(payload: &str, label: &str, trace: &mut CalculationTrace) -> Vec<Row> {
    match parse_rows(payload) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(table = label, error = %e, "Spreadsheet could not be parsed");
            trace.push(format!(
                "  - Error parsing {} data: {}. Proceeding with no rows.",
                label, e
            ));
            Vec::new()
        }
    }
}

/// Everything the pipeline needs besides the request itself
#[derive(Debug, Clone)]
pub struct AllocationPipeline {
    tables: Arc<ReferenceTables>,
    generator: Arc<dyn TextGenerator>,
    default_region: String,
    benchmark_seed: Option<u64>,
}

impl AllocationPipeline {
    pub fn new(
        tables: Arc<ReferenceTables>,
        generator: Arc<dyn TextGenerator>,
        default_region: impl Into<String>,
    ) -> Self {
        Self {
            tables,
            generator,
            default_region: default_region.into(),
            benchmark_seed: None,
        }
    }

    /// Fix the seed of the synthetic peer data
    pub fn with_benchmark_seed(mut self, seed: Option<u64>) -> Self {
        self.benchmark_seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.benchmark_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run every stage for `request`
    pub async fn run(
        &self,
        request: &AllocationRequest,
    ) -> std::result::Result<AllocationResponse, PipelineFailure> {
        let mut trace = CalculationTrace::starting_with("Request received.");
        trace.push("Request body parsed.");

        let valid = match request.validate() {
            Ok(valid) => valid,
            Err(e) => return Err(PipelineFailure { error: e, trace }),
        };
        let beds = if valid.customer_type == CustomerType::Hospital {
            request.customer_beds
        } else {
            0
        };
        trace.push(format!(
            "Input customer: {}, Licenses: {}, Type: {}",
            valid.name,
            valid.licenses.join(", "),
            valid.customer_type
        ));
        info!(customer = %valid.name, customer_type = %valid.customer_type, "Allocation request accepted");

        let peers = parse_customer_list(valid.customers, &mut trace);

        let query = LocationQuery {
            customer_name: valid.name,
            country: valid.country,
            city_state: non_empty(&request.customer_city_state),
            notes: non_empty(&request.additional_notes),
        };
        let location =
            resolve_location(self.generator.as_ref(), &query, &self.default_region, &mut trace)
                .await;
        let region = location.closest_region.clone();

        let enhanced = analyze_enhanced_data(
            request.enhanced_additional_data.as_ref(),
            &self.tables,
            &mut trace,
        );

        let regional_rows = rows_or_empty(valid.regional, "regional cost", &mut trace);
        let product_rows = rows_or_empty(valid.products, "product cost", &mut trace);

        let mut customer = Customer::new(valid.name, region.clone(), valid.licenses)
            .with_type(valid.customer_type)
            .with_beds(beds)
            .with_size(valid.size);

        let consumption =
            ConsumptionModel::new(&self.tables, &enhanced).estimate(&product_rows, &customer, &mut trace);
        let classifier = ProductClassifier::new(&self.tables);
        let product_summary =
            summarize_products(&product_rows, &customer.licenses, &classifier, &mut trace);
        if customer.customer_type == CustomerType::ReferenceLab {
            customer.product_count = product_summary.total_processed_product_count;
        }

        let regional = match regional_cost_metrics(&regional_rows, &region, &self.tables, &mut trace)
        {
            Ok(metrics) => metrics,
            Err(e) => {
                error!(error = %e, region = %region, "Regional cost lookup failed");
                return Err(PipelineFailure::new(e, trace));
            }
        };

        let allocation = allocate(
            &customer,
            &peers,
            regional.specific_region_total_cost,
            &mut trace,
        );

        let regional_peers: Vec<Customer> =
            peers.iter().filter(|c| c.region == region).cloned().collect();
        let benchmark = {
            let mut rng = self.rng();
            BenchmarkScorer::new(&self.tables).analyze(
                &customer,
                &consumption,
                &regional_peers,
                &enhanced,
                &mut rng,
                &mut trace,
            )
        };

        let recommendations = FallbackRecommender::new(self.generator.clone())
            .recommend(
                &RecommendationContext {
                    customer: &customer,
                    benchmark: &benchmark,
                    total_cost: consumption.total_estimated_cost,
                    compliance_requirements: &enhanced.compliance_requirements,
                    usage_patterns: &enhanced.usage_patterns,
                },
                &mut trace,
            )
            .await;

        let final_cost = allocation.final_cost;
        trace.push(format!("Final allocated cost: {}", format_usd(final_cost)));
        info!(customer = %customer.name, final_cost, "Allocation complete");

        Ok(AllocationResponse {
            customer_name: customer.name.clone(),
            customer_location: location.customer_location,
            closest_region: region,
            key_metrics: KeyMetrics {
                reporting_period: regional.reporting_period,
                specific_region_total_aws_cost: regional.specific_region_total_cost,
                regional_cost_ratio: regional.regional_cost_ratio,
                customer_proportion_of_group: allocation.proportion,
                input_customer_total_product_cost: consumption.total_estimated_cost,
                final_cost,
            },
            highlighted_final_cost: format_usd(final_cost),
            customer_licenses: customer.licenses.clone(),
            customer_type: customer.customer_type,
            service_breakdown: consumption.service_breakdown(),
            product_mappings: consumption.product_mappings,
            product_cost_summary: product_summary,
            allocation,
            benchmark_analysis: benchmark,
            optimization_recommendations: recommendations,
            calculation_steps: trace,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}
