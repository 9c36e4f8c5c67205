//! Simple project pricing calculator
//!
//! `monthly = baseCost + users × costPerUser`, looked up by project type and
//! location.

use crate::core::tables::ReferenceTables;
use crate::utils::business::{parse_leading_int, to_fixed2};
use crate::utils::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a pricing request; `users` may arrive as a number or a string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingRequest {
    pub users: Option<Value>,
    pub project_type: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub base_cost: f64,
    pub cost_per_user: f64,
    pub number_of_users: u64,
}

/// Quote with costs rendered to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    pub monthly_cost: String,
    pub yearly_cost: String,
    pub currency: String,
    pub breakdown: PricingBreakdown,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn users_present(users: &Option<Value>) -> bool {
    match users {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Whole number of users, truncating fractions. Negative or non-numeric
/// input yields `None`.
fn user_count(users: &Value) -> Option<u64> {
    let count = match users {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }?;
    u64::try_from(count).ok()
}

/// Price a project
pub fn quote(request: &PricingRequest, tables: &ReferenceTables) -> Result<PricingQuote> {
    let (Some(project_type), Some(location), true) = (
        present(&request.project_type),
        present(&request.location),
        users_present(&request.users),
    ) else {
        return Err(EstimatorError::validation("Missing required fields"));
    };

    let users = request
        .users
        .as_ref()
        .and_then(user_count)
        .ok_or_else(|| EstimatorError::validation("Invalid number of users"))?;

    let pricing = tables
        .project_pricing
        .get(project_type)
        .and_then(|by_location| by_location.get(location))
        .ok_or_else(|| EstimatorError::validation("Invalid project type or location"))?;

    let monthly = pricing.base_cost + users as f64 * pricing.cost_per_user;
    let yearly = monthly * 12.0;

    Ok(PricingQuote {
        monthly_cost: to_fixed2(monthly),
        yearly_cost: to_fixed2(yearly),
        currency: "USD".to_string(),
        breakdown: PricingBreakdown {
            base_cost: pricing.base_cost,
            cost_per_user: pricing.cost_per_user,
            number_of_users: users,
        },
    })
}
