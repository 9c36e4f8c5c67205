//! Best-effort recovery of JSON from generated text

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static NON_GREEDY_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("Invalid JSON object regex"));

static SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""summary"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid summary regex")
});

static ROADMAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""implementationRoadmap"\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("Invalid roadmap regex")
});

static TOTAL_SAVINGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""totalEstimatedSavings"\s*:\s*"?\$?(-?[0-9][0-9,]*(?:\.[0-9]+)?)"#)
        .expect("Invalid total savings regex")
});

static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""title"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid title regex")
});

static DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""description"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid description regex")
});

static SAVINGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""estimatedSavings"\s*:\s*"?\$?(-?[0-9][0-9,]*(?:\.[0-9]+)?)"#)
        .expect("Invalid savings regex")
});

/// The outermost balanced `{...}` block starting at the first `{`.
///
/// Braces inside string literals are ignored.
pub fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Candidate JSON blocks in the order they are tried
pub fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates: Vec<&str> = balanced_object(text).into_iter().collect();
    for m in NON_GREEDY_OBJECT.find_iter(text) {
        if !candidates.contains(&m.as_str()) {
            candidates.push(m.as_str());
        }
    }
    candidates
}

/// First candidate block that parses as a JSON object and deserialises into `T`
pub fn first_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    json_candidates(text).into_iter().find_map(|candidate| {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
            _ => None,
        }
    })
}

/// Undo JSON string escaping of a regex capture, keeping the raw text when
/// it is not a valid JSON string body
pub fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}

fn number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

/// Accepts a number, a numeric string such as `"$1,234.50"`, or null
pub fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => crate::utils::business::parse_money(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

/// One recommendation recovered by regex
#[derive(Debug, Clone, PartialEq)]
pub struct SalvagedItem {
    pub title: String,
    pub description: String,
    pub estimated_savings: f64,
}

/// Fields recovered from text that is not valid JSON
#[derive(Debug, Clone, PartialEq)]
pub struct SalvagedPlan {
    pub summary: Option<String>,
    pub implementation_roadmap: Option<String>,
    pub total_estimated_savings: Option<f64>,
    pub items: Vec<SalvagedItem>,
}

/// Field-by-field regex recovery. Titles, descriptions and savings are paired
/// by position; fails unless at least one title is present.
pub fn salvage_fields(text: &str) -> Option<SalvagedPlan> {
    let titles: Vec<String> = TITLE.captures_iter(text).map(|c| unescape(&c[1])).collect();
    if titles.is_empty() {
        return None;
    }
    let descriptions: Vec<String> = DESCRIPTION
        .captures_iter(text)
        .map(|c| unescape(&c[1]))
        .collect();
    let savings: Vec<f64> = SAVINGS
        .captures_iter(text)
        .map(|c| number(&c[1]).unwrap_or(0.0))
        .collect();

    let items = titles
        .into_iter()
        .enumerate()
        .map(|(i, title)| SalvagedItem {
            title,
            description: descriptions.get(i).cloned().unwrap_or_default(),
            estimated_savings: savings.get(i).copied().unwrap_or(0.0),
        })
        .collect();

    Some(SalvagedPlan {
        summary: SUMMARY.captures(text).map(|c| unescape(&c[1])),
        implementation_roadmap: ROADMAP.captures(text).map(|c| unescape(&c[1])),
        total_estimated_savings: TOTAL_SAVINGS.captures(text).and_then(|c| number(&c[1])),
        items,
    })
}
