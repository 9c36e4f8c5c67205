//! Product-to-lab and product-type classification
//!
//! Both lookups walk an ordered keyword table and take the first
//! case-insensitive substring match. Table order decides ties.

use crate::core::tables::{ProductTypeRule, ReferenceTables};
use once_cell::sync::Lazy;
use regex::Regex;

static LAB_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+lab$").expect("Invalid lab suffix regex"));

/// Assigns free-text product names to lab categories and product types
#[derive(Debug, Clone, Copy)]
pub struct ProductClassifier<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> ProductClassifier<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// Lab for a product.
    ///
    /// Falls back to a license whose name (without a trailing "Lab") appears in
    /// the product name, then to the first license. `None` only when there are
    /// no licenses.
    pub fn assign_lab(&self, product_name: &str, licenses: &[String]) -> Option<String> {
        let product = product_name.to_lowercase();

        if let Some(rule) = self
            .tables
            .lab_rules
            .iter()
            .find(|rule| product.contains(&rule.keyword.to_lowercase()))
        {
            return Some(rule.lab.clone());
        }

        licenses
            .iter()
            .find(|license| {
                let stem = LAB_SUFFIX.replace(&license.to_lowercase(), "").trim().to_string();
                product.contains(&stem)
            })
            .or_else(|| licenses.first())
            .cloned()
    }

    /// Product-type rule for a product, the default type when nothing matches
    pub fn product_type(&self, product_name: &str) -> Option<&'a ProductTypeRule> {
        let product = product_name.to_lowercase();
        self.tables
            .product_types
            .iter()
            .find(|rule| product.contains(&rule.keyword.to_lowercase()))
            .or_else(|| self.tables.product_type(&self.tables.default_product_type))
    }
}
