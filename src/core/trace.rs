//! Human-readable calculation trace
//!
//! Every stage appends the numbers it used so a caller can audit how the
//! final figure came about. The trace only grows; nothing reads it to make
//! decisions.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Append-only list of calculation steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationTrace {
    steps: Vec<String>,
}

impl CalculationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a trace with a first entry
    pub fn starting_with(step: impl Into<String>) -> Self {
        let mut trace = Self::new();
        trace.push(step);
        trace
    }

    /// Append a step
    pub fn push(&mut self, step: impl Into<String>) {
        let step = step.into();
        trace!(step = %step, "calculation step");
        self.steps.push(step);
    }

    /// Append every step of another trace, preserving order
    pub fn extend(&mut self, other: CalculationTrace) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.steps.last().map(String::as_str)
    }

    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }

    /// Whether any step contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.steps.iter().any(|s| s.contains(needle))
    }
}
