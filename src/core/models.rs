//! Customer data model shared by every pipeline stage

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region assumed when nothing better is known
pub const DEFAULT_REGION: &str = "US West (N. California)";

/// License assumed when a customer-list row declares none
pub const DEFAULT_LICENSE: &str = "Core Lab";

/// Size category assumed when none is given
pub const DEFAULT_SIZE: &str = "Medium";

/// Kind of healthcare organisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CustomerType {
    Hospital,
    Clinic,
    ReferenceLab,
    Research,
    #[default]
    Other,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::Clinic => "Clinic",
            Self::ReferenceLab => "Reference Lab",
            Self::Research => "Research",
            Self::Other => "Other",
        }
    }
}

impl From<&str> for CustomerType {
    /// Unrecognised labels are treated as `Other`
    fn from(value: &str) -> Self {
        match value.trim() {
            "Hospital" => Self::Hospital,
            "Clinic" => Self::Clinic,
            "Reference Lab" => Self::ReferenceLab,
            "Research" => Self::Research,
            _ => Self::Other,
        }
    }
}

impl From<String> for CustomerType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<CustomerType> for String {
    fn from(value: CustomerType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer, either the one being estimated or a peer from the uploaded list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub region: String,
    pub licenses: Vec<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    /// Only meaningful for hospitals
    #[serde(default)]
    pub beds: u32,
    /// Only meaningful for reference labs
    #[serde(default)]
    pub product_count: u32,
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

impl Customer {
    pub fn new(name: impl Into<String>, region: impl Into<String>, licenses: Vec<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            licenses,
            customer_type: CustomerType::Other,
            beds: 0,
            product_count: 0,
            size: default_size(),
        }
    }

    pub fn with_type(mut self, customer_type: CustomerType) -> Self {
        self.customer_type = customer_type;
        self
    }

    pub fn with_beds(mut self, beds: u32) -> Self {
        self.beds = beds;
        self
    }

    pub fn with_product_count(mut self, product_count: u32) -> Self {
        self.product_count = product_count;
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    /// Licenses sorted for grouping
    pub fn sorted_licenses(&self) -> Vec<String> {
        let mut licenses = self.licenses.clone();
        licenses.sort();
        licenses
    }

    /// Peer-group key: `region:licenseA,licenseB`
    pub fn group_key(&self) -> String {
        format!("{}:{}", self.region, self.sorted_licenses().join(","))
    }

    /// Whether any license is shared with `other`
    pub fn shares_license_with(&self, other: &Customer) -> bool {
        self.licenses.iter().any(|l| other.licenses.contains(l))
    }

    pub fn holds_license(&self, lab: &str) -> bool {
        self.licenses.iter().any(|l| l == lab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_type_labels() {
        assert_eq!(CustomerType::from("Reference Lab"), CustomerType::ReferenceLab);
        assert_eq!(CustomerType::from(" Hospital "), CustomerType::Hospital);
        assert_eq!(CustomerType::from("Veterinary"), CustomerType::Other);
        assert_eq!(CustomerType::ReferenceLab.to_string(), "Reference Lab");
    }

    #[test]
    fn test_customer_type_serde() {
        let json = serde_json::to_string(&CustomerType::ReferenceLab).unwrap();
        assert_eq!(json, "\"Reference Lab\"");
        let parsed: CustomerType = serde_json::from_str("\"Clinic\"").unwrap();
        assert_eq!(parsed, CustomerType::Clinic);
    }

    #[test]
    fn test_group_key_sorts_licenses() {
        let customer = Customer::new(
            "Acme",
            "US East (Ohio)",
            vec!["Pathology Lab".to_string(), "Core Lab".to_string()],
        );
        assert_eq!(customer.group_key(), "US East (Ohio):Core Lab,Pathology Lab");
    }

    #[test]
    fn test_shares_license() {
        let a = Customer::new("A", DEFAULT_REGION, vec!["Core Lab".to_string()]);
        let b = Customer::new(
            "B",
            DEFAULT_REGION,
            vec!["Molecular Lab".to_string(), "Core Lab".to_string()],
        );
        let c = Customer::new("C", DEFAULT_REGION, vec!["Molecular Lab".to_string()]);
        assert!(a.shares_license_with(&b));
        assert!(!a.shares_license_with(&c));
    }

    #[test]
    fn test_customer_json_shape() {
        let customer = Customer::new("A", DEFAULT_REGION, vec!["Core Lab".to_string()])
            .with_type(CustomerType::Hospital)
            .with_beds(120);
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["type"], "Hospital");
        assert_eq!(value["beds"], 120);
        assert_eq!(value["productCount"], 0);
        assert_eq!(value["size"], "Medium");
    }
}
