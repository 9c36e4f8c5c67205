//! Optimisation recommendations
//!
//! A [`TextGenerator`] drafts the narrative; [`FallbackRecommender`] turns its
//! untrusted output into [`OptimizationRecommendations`], salvaging what it
//! can and substituting a canned plan when nothing usable comes back.

pub mod generator;
pub mod prompt;
pub mod salvage;

pub use generator::{DisabledGenerator, OllamaGenerator, StaticGenerator, TextGenerator};
pub use prompt::{RecommendationContext, optimization_prompt};

use crate::core::trace::CalculationTrace;
use salvage::{SalvagedPlan, first_json_object, lenient_f64, salvage_fields};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// One recommended action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrioritizedAction {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_savings: f64,
    pub time_to_implement: String,
    pub difficulty: String,
    pub action_items: Vec<String>,
    pub priority: String,
}

/// Where a set of recommendations came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Parsed from a JSON reply
    Llm,
    /// Recovered field by field from a malformed reply
    Salvaged,
    /// Canned plan
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecommendations {
    pub summary: String,
    /// Descriptions of the prioritised actions
    pub recommendations: Vec<String>,
    pub prioritized_actions: Vec<PrioritizedAction>,
    pub estimated_savings: f64,
    pub implementation_roadmap: String,
    pub source: RecommendationSource,
}

/// Reply shape requested by the optimisation prompt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GeneratedPlan {
    summary: Option<String>,
    prioritized_recommendations: Vec<PrioritizedAction>,
    #[serde(deserialize_with = "lenient_f64")]
    total_estimated_savings: f64,
    implementation_roadmap: Option<String>,
}

impl Default for GeneratedPlan {
    fn default() -> Self {
        Self {
            summary: None,
            prioritized_recommendations: Vec::new(),
            total_estimated_savings: 0.0,
            implementation_roadmap: None,
        }
    }
}

impl OptimizationRecommendations {
    fn from_actions(
        summary: String,
        actions: Vec<PrioritizedAction>,
        estimated_savings: f64,
        implementation_roadmap: String,
        source: RecommendationSource,
    ) -> Self {
        Self {
            summary,
            recommendations: actions.iter().map(|a| a.description.clone()).collect(),
            prioritized_actions: actions,
            estimated_savings,
            implementation_roadmap,
            source,
        }
    }

    fn from_generated(plan: GeneratedPlan) -> Self {
        Self::from_actions(
            plan.summary.unwrap_or_default(),
            plan.prioritized_recommendations,
            plan.total_estimated_savings,
            plan.implementation_roadmap.unwrap_or_default(),
            RecommendationSource::Llm,
        )
    }

    fn from_salvaged(plan: SalvagedPlan) -> Self {
        let item_total: f64 = plan.items.iter().map(|i| i.estimated_savings).sum();
        let actions = plan
            .items
            .into_iter()
            .map(|item| PrioritizedAction {
                title: item.title,
                description: item.description,
                estimated_savings: item.estimated_savings,
                ..Default::default()
            })
            .collect();
        Self::from_actions(
            plan.summary.unwrap_or_default(),
            actions,
            plan.total_estimated_savings.unwrap_or(item_total),
            plan.implementation_roadmap.unwrap_or_default(),
            RecommendationSource::Salvaged,
        )
    }
}

/// Interpret generated text: a JSON block first, then regex salvage
pub fn parse_generated(text: &str) -> Option<OptimizationRecommendations> {
    if let Some(plan) = first_json_object::<GeneratedPlan>(text) {
        return Some(OptimizationRecommendations::from_generated(plan));
    }
    salvage_fields(text).map(OptimizationRecommendations::from_salvaged)
}

fn canned_action(
    title: &str,
    description: &str,
    savings: f64,
    time: &str,
    difficulty: &str,
    items: &[&str],
    priority: &str,
) -> PrioritizedAction {
    PrioritizedAction {
        title: title.to_string(),
        description: description.to_string(),
        estimated_savings: savings,
        time_to_implement: time.to_string(),
        difficulty: difficulty.to_string(),
        action_items: items.iter().map(|s| s.to_string()).collect(),
        priority: priority.to_string(),
    }
}

/// Canned plan: 15%, 12% and 10% of the total monthly cost
pub fn fallback_recommendations(total_cost: f64) -> OptimizationRecommendations {
    let actions = vec![
        canned_action(
            "Implement Reserved Instances",
            "Purchase Reserved Instances for predictable EC2 workloads to reduce costs by up to 75%",
            total_cost * 0.15,
            "1-2 weeks",
            "easy",
            &[
                "Analyze EC2 usage patterns",
                "Purchase 1-year Reserved Instances for stable workloads",
                "Monitor and adjust reservations quarterly",
            ],
            "high",
        ),
        canned_action(
            "Optimize Storage Lifecycle",
            "Implement S3 lifecycle policies to automatically transition data to cheaper storage classes",
            total_cost * 0.12,
            "2-3 weeks",
            "medium",
            &[
                "Audit current S3 storage usage",
                "Create lifecycle policies for infrequently accessed data",
                "Enable intelligent tiering",
            ],
            "medium",
        ),
        canned_action(
            "Right-size Resources",
            "Analyze and optimize instance sizes based on actual utilization metrics",
            total_cost * 0.10,
            "3-4 weeks",
            "medium",
            &[
                "Install CloudWatch agent for detailed metrics",
                "Analyze CPU and memory utilization",
                "Downsize over-provisioned instances",
            ],
            "high",
        ),
    ];
    let total = actions.iter().map(|a| a.estimated_savings).sum();

    OptimizationRecommendations::from_actions(
        "Standard optimization plan covering reserved capacity, storage lifecycle and right-sizing."
            .to_string(),
        actions,
        total,
        "Reserved Instances first, then storage lifecycle policies, then right-sizing.".to_string(),
        RecommendationSource::Fallback,
    )
}

/// Wraps a [`TextGenerator`] so that recommendation requests never fail
#[derive(Debug, Clone)]
pub struct FallbackRecommender {
    generator: Arc<dyn TextGenerator>,
}

impl FallbackRecommender {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn recommend(
        &self,
        ctx: &RecommendationContext<'_>,
        trace: &mut CalculationTrace,
    ) -> OptimizationRecommendations {
        trace.push("Step 6: Generating AI-powered cost optimization recommendations");

        let prompt = optimization_prompt(ctx);
        let result = match self.generator.generate(&prompt).await {
            Ok(text) => match parse_generated(&text) {
                Some(parsed) => Ok(parsed),
                None => Err("response contained no usable recommendations".to_string()),
            },
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(recommendations) => {
                trace.push(format!(
                    "  - LLM generated {} optimization recommendations",
                    recommendations.prioritized_actions.len()
                ));
                trace.push(format!(
                    "  - Total estimated potential savings: ${:.2}",
                    recommendations.estimated_savings
                ));
                info!(
                    generator = self.generator.name(),
                    source = ?recommendations.source,
                    "Recommendations generated"
                );
                recommendations
            }
            Err(reason) => {
                warn!(generator = self.generator.name(), %reason, "Using fallback recommendations");
                trace.push(format!(
                    "  - LLM optimization failed: {}. Using fallback recommendations.",
                    reason
                ));
                fallback_recommendations(ctx.total_cost)
            }
        }
    }
}
