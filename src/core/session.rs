//! Wizard session state
//!
//! The wizard collects its inputs over several pages: upload, customer info,
//! questionnaire, results, then forecast. [`WizardSession`] holds what has been
//! gathered so far and turns it into an allocation request once the earlier
//! stages are complete.

use crate::core::enhanced::EnhancedAdditionalData;
use crate::core::models::{CustomerType, DEFAULT_SIZE};
use crate::core::pipeline::{AllocationRequest, AllocationResponse};
use crate::utils::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key the serialized session is stored under
pub const STORAGE_KEY: &str = "formData";

/// Monthly cost the forecast page starts from when no result is stored
pub const DEFAULT_FORECAST_BASE_COST: f64 = 5000.0;

/// Base64 spreadsheet payloads from the upload page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadedFiles {
    pub regional_cost_data: Option<String>,
    pub product_cost_data: Option<String>,
    pub customer_list_data: Option<String>,
}

/// Customer details from the customer-info page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub country: Option<String>,
    pub city_state: Option<String>,
    pub licenses: Vec<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<String>,
    pub beds: Option<u32>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardSession {
    pub files: UploadedFiles,
    pub customer: CustomerInfo,
    pub extra: Option<EnhancedAdditionalData>,
    /// Last allocation response, kept as JSON for the results and forecast pages
    pub result: Option<Value>,
}

fn filled(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: UploadedFiles) -> Self {
        self.files = files;
        self
    }

    pub fn with_customer(mut self, customer: CustomerInfo) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_extra(mut self, extra: EnhancedAdditionalData) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Store a finished allocation
    pub fn record_result(&mut self, response: &AllocationResponse) -> Result<()> {
        self.result = Some(serde_json::to_value(response)?);
        Ok(())
    }

    /// Start over
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Build the allocation request, failing if an earlier page is incomplete
    pub fn calculation_request(&self) -> Result<AllocationRequest> {
        let files = &self.files;
        let (Some(regional), Some(products), Some(customers)) = (
            filled(&files.regional_cost_data),
            filled(&files.product_cost_data),
            filled(&files.customer_list_data),
        ) else {
            return Err(EstimatorError::validation(
                "All three spreadsheets must be uploaded before calculating",
            ));
        };

        let customer = &self.customer;
        let (Some(name), Some(country)) = (filled(&customer.name), filled(&customer.country))
        else {
            return Err(EstimatorError::validation(
                "Customer name and country are required",
            ));
        };
        if customer.licenses.is_empty() {
            return Err(EstimatorError::validation(
                "At least one lab license must be selected",
            ));
        }

        Ok(AllocationRequest {
            customer_name: Some(name),
            customer_country: Some(country),
            customer_city_state: filled(&customer.city_state),
            customer_licenses: Some(Value::from(customer.licenses.clone())),
            regional_cost_breakdown_data: Some(regional),
            product_cost_data: Some(products),
            customer_list_data: Some(customers),
            additional_notes: self
                .extra
                .as_ref()
                .and_then(|extra| filled(&extra.additional_notes)),
            enhanced_additional_data: self.extra.clone(),
            customer_type: Some(
                filled(&customer.customer_type)
                    .unwrap_or_else(|| CustomerType::Other.to_string()),
            ),
            customer_beds: customer.beds.unwrap_or(0),
            customer_size: Some(filled(&customer.size).unwrap_or_else(|| DEFAULT_SIZE.to_string())),
        })
    }

    /// Final cost of the stored result, or [`DEFAULT_FORECAST_BASE_COST`]
    pub fn forecast_base_cost(&self) -> f64 {
        self.result
            .as_ref()
            .and_then(|r| r.pointer("/keyMetrics/finalCost"))
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_FORECAST_BASE_COST)
    }

    /// Serialize as a `{"formData": {...}}` document
    pub fn to_storage(&self) -> Result<Value> {
        Ok(serde_json::json!({ STORAGE_KEY: serde_json::to_value(self)? }))
    }

    /// Restore from a storage document; a missing entry gives an empty session
    pub fn from_storage(document: &Value) -> Result<Self> {
        match document.get(STORAGE_KEY) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> WizardSession {
        WizardSession::new()
            .with_files(UploadedFiles {
                regional_cost_data: Some("cmVnaW9uYWw=".to_string()),
                product_cost_data: Some("cHJvZHVjdHM=".to_string()),
                customer_list_data: Some("Y3VzdG9tZXJz".to_string()),
            })
            .with_customer(CustomerInfo {
                name: Some("Lakeside".to_string()),
                country: Some("USA".to_string()),
                licenses: vec!["Core Lab".to_string()],
                ..Default::default()
            })
    }

    #[test]
    fn test_request_defaults() {
        let request = complete().calculation_request().unwrap();
        assert_eq!(request.customer_type.as_deref(), Some("Other"));
        assert_eq!(request.customer_beds, 0);
        assert_eq!(request.customer_size.as_deref(), Some("Medium"));
        assert_eq!(request.customer_licenses, Some(json!(["Core Lab"])));
        assert!(request.enhanced_additional_data.is_none());
    }

    #[test]
    fn test_incomplete_stages_are_rejected() {
        let mut missing_file = complete();
        missing_file.files.product_cost_data = None;
        assert!(missing_file.calculation_request().unwrap_err().is_client_error());

        let mut no_licenses = complete();
        no_licenses.customer.licenses.clear();
        assert!(no_licenses.calculation_request().is_err());

        let mut blank_name = complete();
        blank_name.customer.name = Some("  ".to_string());
        assert!(blank_name.calculation_request().is_err());
    }

    #[test]
    fn test_forecast_base_cost() {
        let mut session = complete();
        assert_eq!(session.forecast_base_cost(), DEFAULT_FORECAST_BASE_COST);
        session.result = Some(json!({ "keyMetrics": { "finalCost": 1234.5 } }));
        assert_eq!(session.forecast_base_cost(), 1234.5);
    }

    #[test]
    fn test_storage_and_clear() {
        let mut session = complete();
        let stored = session.to_storage().unwrap();
        assert_eq!(stored["formData"]["customer"]["name"], "Lakeside");
        assert_eq!(WizardSession::from_storage(&stored).unwrap(), session);

        session.clear();
        assert_eq!(session, WizardSession::default());
        assert_eq!(WizardSession::from_storage(&json!({})).unwrap(), WizardSession::default());
    }
}
