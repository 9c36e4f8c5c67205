//! Consumption and cost model
//!
//! Estimates monthly cloud spend per lab and service from the product table
//! plus a per-lab base load.

use crate::core::classifier::ProductClassifier;
use crate::core::enhanced::EnhancedAnalysis;
use crate::core::models::Customer;
use crate::core::products::ProductColumns;
use crate::core::spreadsheet::Row;
use crate::core::tables::ReferenceTables;
use crate::core::trace::CalculationTrace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Estimated spend broken down by lab and service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionEstimate {
    /// Product name to assigned lab
    pub product_mappings: BTreeMap<String, String>,
    /// Lab to service to accumulated cost
    pub lab_service_costs: BTreeMap<String, BTreeMap<String, f64>>,
    pub total_estimated_cost: f64,
}

impl ConsumptionEstimate {
    /// Cost per service summed across labs
    pub fn service_breakdown(&self) -> BTreeMap<String, f64> {
        let mut breakdown = BTreeMap::new();
        for services in self.lab_service_costs.values() {
            for (service, cost) in services {
                *breakdown.entry(service.clone()).or_insert(0.0) += cost;
            }
        }
        breakdown
    }

    fn add(&mut self, lab: &str, service: &str, cost: f64) {
        *self
            .lab_service_costs
            .entry(lab.to_string())
            .or_default()
            .entry(service.to_string())
            .or_insert(0.0) += cost;
        self.total_estimated_cost += cost;
    }
}

/// Combines the reference tables with questionnaire multipliers to cost a
/// customer's products
pub struct ConsumptionModel<'a> {
    tables: &'a ReferenceTables,
    enhanced: &'a EnhancedAnalysis,
}

impl<'a> ConsumptionModel<'a> {
    pub fn new(tables: &'a ReferenceTables, enhanced: &'a EnhancedAnalysis) -> Self {
        Self { tables, enhanced }
    }

    /// Estimate per-lab, per-service monthly cost for `customer`.
    ///
    /// Products are costed against whichever lab they classify into. The base
    /// load is added for every licensed lab that has a profile.
    pub fn estimate(
        &self,
        rows: &[Row],
        customer: &Customer,
        trace: &mut CalculationTrace,
    ) -> ConsumptionEstimate {
        trace.push("Step 2: Enhanced product-to-lab mapping with AWS service consumption analysis");

        let classifier = ProductClassifier::new(self.tables);
        let columns = ProductColumns::locate(rows);
        let region = customer.region.as_str();
        let mut estimate = ConsumptionEstimate::default();

        for license in &customer.licenses {
            let services = estimate.lab_service_costs.entry(license.clone()).or_default();
            if let Some(profile) = self.tables.lab_profiles.get(license) {
                for service in profile.services.keys() {
                    services.insert(service.clone(), 0.0);
                }
            }
        }

        for row in rows {
            let name = columns.product_name(row);
            let Some(lab) = classifier.assign_lab(&name, &customer.licenses) else {
                continue;
            };
            let Some(profile) = self.tables.lab_profiles.get(&lab) else {
                continue;
            };
            estimate.product_mappings.insert(name.clone(), lab.clone());

            let Some(product_type) = classifier.product_type(&name) else {
                continue;
            };
            for service in &product_type.primary_services {
                let Some(config) = profile.services.get(service) else {
                    continue;
                };
                let cost = config.cost_per_product
                    * product_type.cost_multiplier
                    * self.tables.regional_multiplier(region, service)
                    * config.utilization_factor
                    * self.enhanced.cost_multiplier(service);
                estimate.add(&lab, service, cost);
            }
        }
        trace.push(format!(
            "  - Mapped {} of {} products to labs",
            estimate.product_mappings.len(),
            rows.len()
        ));

        let scaling = self
            .tables
            .customer_type_scaling(customer.customer_type.as_str());
        for license in &customer.licenses {
            let Some(profile) = self.tables.lab_profiles.get(license) else {
                continue;
            };
            let mut lab_base = 0.0;
            for (service, config) in &profile.services {
                let cost = config.base_units
                    * scaling
                    * self.tables.regional_multiplier(region, service)
                    * config.utilization_factor
                    * self.enhanced.cost_multiplier(service);
                lab_base += cost;
                estimate.add(license, service, cost);
            }
            trace.push(format!(
                "  - {} base consumption (scaling factor {} for {}): ${:.2}",
                license, scaling, customer.customer_type, lab_base
            ));
        }

        trace.push(format!(
            "  - Total estimated AWS cost based on enhanced methodology: ${:.2}",
            estimate.total_estimated_cost
        ));
        debug!(
            total = estimate.total_estimated_cost,
            products = estimate.product_mappings.len(),
            "Consumption estimate complete"
        );

        estimate
    }
}
