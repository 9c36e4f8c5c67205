//! Regional cost allocator
//!
//! Reads the "all regions" cost table: the grand-total row and the row of the
//! customer's region, both for the most recent month column.

use crate::core::spreadsheet::Row;
use crate::core::tables::ReferenceTables;
use crate::core::trace::CalculationTrace;
use crate::utils::business::parse_money;
use crate::utils::error::{EstimatorError, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, warn};

/// Column holding the region label
pub const REGION_COLUMN: &str = "Region";

static MONTH_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+/\d+/\d+").expect("Invalid month column regex"));

/// Costs of one region against the grand total for the reporting month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalCostMetrics {
    /// Header of the most recent month column
    pub reporting_period: String,
    /// Region whose row was used
    pub resolved_region: String,
    pub grand_total_cost: f64,
    pub specific_region_total_cost: f64,
    /// `region / grand total`, 0 when the grand total is 0
    pub regional_cost_ratio: f64,
}

/// Expand bare `US West` / `US East` to their default regions
pub fn expand_short_region(region: &str) -> String {
    match region.trim() {
        "US West" => "US West (N. California)".to_string(),
        "US East" => "US East (N. Virginia)".to_string(),
        other => other.to_string(),
    }
}

fn month_date(column: &str) -> Option<NaiveDate> {
    let text = MONTH_COLUMN.find(column)?.as_str();
    let format = match text.rsplit('/').next() {
        Some(year) if year.len() <= 2 => "%m/%d/%y",
        _ => "%m/%d/%Y",
    };
    NaiveDate::parse_from_str(text, format).ok()
}

/// Most recent month column among `columns`; unparsable dates sort last
pub fn most_recent_month<'a>(columns: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut months: Vec<&str> = columns.filter(|c| MONTH_COLUMN.is_match(c)).collect();
    months.sort_by(|a, b| match (month_date(a), month_date(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    months.first().map(|m| m.to_string())
}

/// Region label of a row; the header is matched ignoring case
fn region_label(row: &Row) -> String {
    row.column_named(REGION_COLUMN)
        .map(|column| row.text(column))
        .unwrap_or_default()
}

fn find_row<'a>(rows: &'a [Row], pred: impl Fn(&str) -> bool) -> Option<&'a Row> {
    rows.iter().find(|row| pred(&region_label(row)))
}

fn month_value(row: &Row, month: &str) -> f64 {
    if month.is_empty() {
        return 0.0;
    }
    parse_money(&row.text(month)).unwrap_or(0.0)
}

/// Locate the grand-total and region rows and compute the regional cost ratio.
///
/// Fails when the table has no "total costs" row, or when neither the region,
/// its name variants nor the fallback region has a row.
pub fn regional_cost_metrics(
    rows: &[Row],
    closest_region: &str,
    tables: &ReferenceTables,
    trace: &mut CalculationTrace,
) -> Result<RegionalCostMetrics> {
    trace.push("Step 3: Calculating Regional Cost Metrics");

    let requested = expand_short_region(closest_region);

    let total_row = find_row(rows, |label| label.to_lowercase().contains("total costs"))
        .ok_or_else(|| {
            EstimatorError::regional_data("Could not find total costs row in regional data")
        })?;

    let month = most_recent_month(total_row.columns()).unwrap_or_default();
    if month.is_empty() {
        warn!("Regional cost table has no month columns");
        trace.push("  - Warning: no month columns found in regional data; costs default to $0.00");
    }
    let grand_total = month_value(total_row, &month);
    trace.push(format!("  - Most recent month for reporting: {}", month));
    trace.push(format!(
        "  - Grand total AWS cost (all regions) for {}: ${:.2}",
        month, grand_total
    ));

    let mut resolved = requested.clone();
    let mut region_row = find_row(rows, |label| label.contains(&requested));

    if region_row.is_none() {
        for entry in &tables.region_variants {
            let bare = entry.standard.split(" (").next().unwrap_or(&entry.standard);
            if !entry.variants.contains(&requested) && requested != bare {
                continue;
            }
            if let Some(row) = entry
                .variants
                .iter()
                .find_map(|variant| find_row(rows, |label| label.contains(variant.as_str())))
            {
                resolved = entry.standard.clone();
                region_row = Some(row);
                break;
            }
        }
    }

    let region_row = match region_row {
        Some(row) => row,
        None => {
            trace.push(format!(
                "  - Warning: Region '{}' not found. Defaulting to '{}' data.",
                closest_region, tables.fallback_region
            ));
            resolved = tables.fallback_region.clone();
            find_row(rows, |label| {
                label.contains(&tables.fallback_region) && !label.contains("Oregon")
            })
            .ok_or_else(|| {
                EstimatorError::regional_data(format!(
                    "Could not find cost data for region: {} even after fallback.",
                    tables.fallback_region
                ))
            })?
        }
    };

    let region_total = month_value(region_row, &month);
    trace.push(format!(
        "  - {} cost for {}: ${:.2}",
        resolved, month, region_total
    ));

    let ratio = if grand_total > 0.0 {
        region_total / grand_total
    } else {
        0.0
    };
    trace.push(format!(
        "  - Regional cost ratio ({} / Grand Total): ${:.2} / ${:.2} = {:.4}",
        resolved, region_total, grand_total, ratio
    ));
    info!(region = %resolved, month = %month, region_total, ratio, "Regional cost metrics computed");

    Ok(RegionalCostMetrics {
        reporting_period: month,
        resolved_region: resolved,
        grand_total_cost: grand_total,
        specific_region_total_cost: region_total,
        regional_cost_ratio: ratio,
    })
}
