//! Product cost summary
//!
//! Locates the name, cost and cloud-cost columns of the product table and
//! totals the customer's licensed products.

use crate::core::classifier::ProductClassifier;
use crate::core::spreadsheet::Row;
use crate::core::trace::CalculationTrace;
use crate::utils::business::parse_money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const NAME_COLUMNS: &[&str] = &["Product Name", "Product", "ProductName", "Name", "Item", "Description"];
const COST_COLUMNS: &[&str] = &["Grand Total", "Cost", "Price", "ProductCost", "ItemCost", "Total Cost"];
const CLOUD_COST_COLUMNS: &[&str] = &["AWS", "AWSCost", "AWS Cost", "AWS_Cost", "Cloud Cost", "CloudCost"];

/// Share of product cost assumed to be cloud spend when the table has none
const CLOUD_COST_SHARE: f64 = 0.3;

/// Cloud cost assumed per license when no product carries any
const FALLBACK_COST_PER_LICENSE: f64 = 5000.0;

/// Header names used to read the product table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColumns {
    pub name: String,
    pub cost: String,
    pub cloud_cost: String,
}

impl Default for ProductColumns {
    fn default() -> Self {
        Self {
            name: "Product".to_string(),
            cost: "Cost".to_string(),
            cloud_cost: "AWSCost".to_string(),
        }
    }
}

impl ProductColumns {
    /// First accepted header present in the first row, per field
    pub fn locate(rows: &[Row]) -> Self {
        let mut columns = Self::default();
        let Some(first) = rows.first() else {
            return columns;
        };
        let pick = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| first.column_named(c))
                .map(str::to_string)
        };
        if let Some(name) = pick(NAME_COLUMNS) {
            columns.name = name;
        }
        if let Some(cost) = pick(COST_COLUMNS) {
            columns.cost = cost;
        }
        if let Some(cloud) = pick(CLOUD_COST_COLUMNS) {
            columns.cloud_cost = cloud;
        }
        columns
    }

    /// Product name of a row, `Unknown Product` when blank
    pub fn product_name(&self, row: &Row) -> String {
        match row.get(&self.name) {
            Some(value) if !value.is_blank() => value.as_text(),
            _ => "Unknown Product".to_string(),
        }
    }
}

/// Per-lab product totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabProductMetrics {
    pub product_count: u32,
    pub total_cloud_cost: f64,
}

/// Totals over the customer's licensed products
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCostSummary {
    pub columns: ProductColumns,
    pub product_lab_mappings: BTreeMap<String, String>,
    pub license_costs: BTreeMap<String, f64>,
    pub lab_metrics: BTreeMap<String, LabProductMetrics>,
    pub total_cloud_cost: f64,
    pub total_processed_product_count: u32,
}

/// Summarise product and cloud costs per license
pub fn summarize_products(
    rows: &[Row],
    licenses: &[String],
    classifier: &ProductClassifier<'_>,
    trace: &mut CalculationTrace,
) -> ProductCostSummary {
    trace.push("Step 2.5: Mapping products to labs and summarising product costs for input customer");

    let columns = ProductColumns::locate(rows);
    trace.push(format!(
        "  - Using product columns: Name='{}', Cost='{}', AWS Cost='{}'",
        columns.name, columns.cost, columns.cloud_cost
    ));

    let mut summary = ProductCostSummary {
        license_costs: licenses.iter().map(|l| (l.clone(), 0.0)).collect(),
        lab_metrics: licenses
            .iter()
            .map(|l| (l.clone(), LabProductMetrics::default()))
            .collect(),
        ..Default::default()
    };

    for row in rows {
        summary.total_processed_product_count += 1;
        let name = columns.product_name(row);
        let product_cost = parse_money(&row.text(&columns.cost)).unwrap_or(0.0);

        let cloud_cost = match parse_money(&row.text(&columns.cloud_cost)) {
            Some(cost) if cost != 0.0 => cost,
            _ => {
                let fallback = product_cost * CLOUD_COST_SHARE;
                trace.push(format!(
                    "  - Info: AWS cost for product '{}' not found or zero, falling back to 30% of product cost (${:.2} * 0.3 = ${:.2})",
                    name, product_cost, fallback
                ));
                fallback
            }
        };

        let Some(lab) = classifier.assign_lab(&name, licenses) else {
            continue;
        };
        if !licenses.contains(&lab) {
            continue;
        }

        *summary.license_costs.entry(lab.clone()).or_insert(0.0) += product_cost;
        summary.total_cloud_cost += cloud_cost;
        if let Some(metrics) = summary.lab_metrics.get_mut(&lab) {
            metrics.total_cloud_cost += cloud_cost;
            metrics.product_count += 1;
        }
        summary.product_lab_mappings.insert(name, lab);
    }

    for (lab, metrics) in &summary.lab_metrics {
        trace.push(format!(
            "  - {}: {} products, total AWS cost contribution: ${:.2}",
            lab, metrics.product_count, metrics.total_cloud_cost
        ));
    }

    if summary.total_cloud_cost == 0.0 && !rows.is_empty() {
        trace.push("  - Warning: Total AWS cost for input customer products is $0. Using fallback.");
        summary.total_cloud_cost = FALLBACK_COST_PER_LICENSE * licenses.len() as f64;
        trace.push(format!(
            "  - Fallback total AWS cost: $5,000 x {} licenses = ${:.2}",
            licenses.len(),
            summary.total_cloud_cost
        ));
    }
    trace.push(format!(
        "  - Total processed product count for input customer: {}",
        summary.total_processed_product_count
    ));
    trace.push(format!(
        "  - Total AWS cost for input customer's products: ${:.2}",
        summary.total_cloud_cost
    ));

    summary
}
