//! Customer location and closest-region resolution

use crate::core::recommendations::TextGenerator;
use crate::core::recommendations::salvage::first_json_object;
use crate::core::regional::expand_short_region;
use crate::core::trace::CalculationTrace;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Region assumed when the reply names none
pub const FALLBACK_REGION: &str = "US West (N. California)";

/// Region names accepted verbatim from a JSON reply
pub const KNOWN_REGIONS: &[&str] = &[
    "US West (Oregon)",
    "US West (N. California)",
    "US East (N. Virginia)",
    "US East (Ohio)",
    "Europe (Frankfurt)",
    "Asia Pacific (Tokyo)",
    "Asia Pacific (Singapore)",
];

static LOCATION_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)customer(?:'s)?\s+location.*?(?:is|:)\s*["']?(.*?)["']?(?:\.|,|\n|$)"#)
        .expect("Invalid location regex")
});

static CANONICAL_REGION_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)closest\s+region\s+is\s*["']?(US\s+West\s+\(Oregon\))["']?"#,
        r#"(?i)closest\s+region\s+is\s*["']?(US\s+West\s+\(N\.\s+California\))["']?"#,
        r#"(?i)closest\s+region\s+is\s*["']?(US\s+East\s+\(N\.\s+Virginia\))["']?"#,
        r#"(?i)closest\s+region\s+is\s*["']?(US\s+East\s+\(Ohio\))["']?"#,
        r#"(?i)closest\s+region\s+is\s*["']?(Europe\s+\([^)]+\))["']?"#,
        r#"(?i)closest\s+region\s+is\s*["']?(Asia\s+Pacific\s+\([^)]+\))["']?"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid region regex"))
    .collect()
});

static REGION_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)closest\s+region.*?(?:is|:)\s*["']?(.*?)["']?(?:\.|,|\n|$)"#)
        .expect("Invalid region phrase regex")
});

/// Customer details the location prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct LocationQuery<'a> {
    pub customer_name: &'a str,
    pub country: &'a str,
    pub city_state: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl LocationQuery<'_> {
    /// City/state when given, else the country
    pub fn fallback_location(&self) -> String {
        self.city_state
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.country)
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationAnswer {
    pub customer_location: Option<String>,
    pub closest_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub customer_location: String,
    pub closest_region: String,
}

pub fn location_prompt(query: &LocationQuery<'_>) -> String {
    format!(
        r#"You are an expert in geospatial mapping and AWS cost analysis.
Given the customer: {}, {}, {}, {}
And AWS regions: US West (Oregon), US West (N. California), US East (N. Virginia), US East (Ohio), Europe (Frankfurt), etc.
1. Approximate customer's location.
2. Find the geographically closest AWS region.
Output STRICTLY JSON: {{"customerLocation": "...", "closestRegion": "..."}}"#,
        query.customer_name,
        query.country,
        query.city_state.unwrap_or(""),
        query.notes.unwrap_or("")
    )
}

fn short_region(region: &str) -> Option<&'static str> {
    match region {
        "US West" => Some("US West (N. California)"),
        "US East" => Some("US East (N. Virginia)"),
        "Europe" => Some("Europe (Frankfurt)"),
        "Asia Pacific" => Some("Asia Pacific (Tokyo)"),
        _ => None,
    }
}

fn bare_prefix(region: &str) -> &str {
    region.split('(').next().unwrap_or(region).trim()
}

/// "The customer location is X" style phrase
pub fn extract_location(text: &str) -> Option<String> {
    LOCATION_PHRASE
        .captures(text)
        .map(|c| c[1].trim().to_string())
}

/// Region named in free text, defaulting to [`FALLBACK_REGION`]
pub fn extract_region(text: &str) -> String {
    for pattern in CANONICAL_REGION_PHRASES.iter() {
        if let Some(c) = pattern.captures(text) {
            return c[1].to_string();
        }
    }
    if let Some(c) = REGION_PHRASE.captures(text) {
        let region = bare_prefix(c[1].trim());
        return short_region(region).unwrap_or(region).to_string();
    }
    FALLBACK_REGION.to_string()
}

/// Interpret a reply: a JSON answer first, then phrase extraction
pub fn interpret_reply(text: &str) -> LocationAnswer {
    if let Some(mut answer) = first_json_object::<LocationAnswer>(text) {
        if let Some(region) = answer.closest_region.as_mut() {
            if region.contains('(') && !KNOWN_REGIONS.contains(&region.as_str()) {
                *region = bare_prefix(region).to_string();
            }
        }
        return answer;
    }
    LocationAnswer {
        customer_location: extract_location(text),
        closest_region: Some(extract_region(text)),
    }
}

/// Resolve location and closest region; generation failures fall back to the
/// customer's own city/state or country and `default_region`
pub async fn resolve_location(
    generator: &dyn TextGenerator,
    query: &LocationQuery<'_>,
    default_region: &str,
    trace: &mut CalculationTrace,
) -> ResolvedLocation {
    trace.push("Step 1: Determining customer location and closest AWS region via LLM.");

    match generator.generate(&location_prompt(query)).await {
        Ok(text) => {
            let answer = interpret_reply(&text);
            let customer_location = answer
                .customer_location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| query.fallback_location());
            let closest_region = answer
                .closest_region
                .filter(|r| !r.trim().is_empty())
                .map(|r| expand_short_region(&r))
                .unwrap_or_else(|| default_region.to_string());
            trace.push(format!(
                "  - LLM determined location: {}, Closest Region: {}",
                customer_location, closest_region
            ));
            info!(location = %customer_location, region = %closest_region, "Customer location resolved");
            ResolvedLocation {
                customer_location,
                closest_region,
            }
        }
        Err(e) => {
            warn!(error = %e, "Location lookup failed, using defaults");
            trace.push(format!("  - LLM Error for Step 1: {}. Using defaults.", e));
            ResolvedLocation {
                customer_location: query.fallback_location(),
                closest_region: default_region.to_string(),
            }
        }
    }
}
