//! Prompt construction for optimisation narratives

use crate::core::benchmark::BenchmarkAnalysis;
use crate::core::models::Customer;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Everything the optimisation prompt summarises
#[derive(Debug, Clone, Copy)]
pub struct RecommendationContext<'a> {
    pub customer: &'a Customer,
    pub benchmark: &'a BenchmarkAnalysis,
    pub total_cost: f64,
    pub compliance_requirements: &'a [String],
    pub usage_patterns: &'a BTreeMap<String, String>,
}

/// Build the optimisation prompt, including the JSON shape the reply must use
pub fn optimization_prompt(ctx: &RecommendationContext<'_>) -> String {
    let customer = ctx.customer;
    let benchmark = ctx.benchmark;

    let compliance = if ctx.compliance_requirements.is_empty() {
        "None specified".to_string()
    } else {
        ctx.compliance_requirements.join(", ")
    };
    let usage = if ctx.usage_patterns.is_empty() {
        "Standard".to_string()
    } else {
        ctx.usage_patterns
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut services = String::new();
    for (service, data) in &benchmark.service_efficiency_breakdown {
        let _ = writeln!(
            services,
            "- {}: ${:.2} ({:.1}th percentile, {:.0}% optimization potential)",
            service,
            data.current_cost,
            data.benchmark_percentile,
            data.optimization_potential * 100.0
        );
    }

    let mut opportunities = String::new();
    for (i, opp) in benchmark.cost_optimization_opportunities.iter().enumerate() {
        let _ = writeln!(
            opportunities,
            "{}. {} - {} (Potential savings: ${:.2}, Difficulty: {})",
            i + 1,
            opp.category,
            opp.description,
            opp.potential_savings,
            opp.implementation_difficulty
        );
    }

    format!(
        r#"You are an AWS cost optimization expert analyzing a {kind} customer with the following profile:

Customer Details:
- Name: {name}
- Type: {kind}
- Region: {region}
- Lab Licenses: {licenses}
- Total Monthly AWS Cost: ${total:.2}

Additional Context:
- Compliance Needs: {compliance}
- Usage Patterns: {usage}

Benchmarking Analysis:
- Overall Efficiency Score: {score:.1}%
- Regional Percentile: {percentile:.1}th percentile

Service Cost Breakdown and Benchmarks:
{services}
Identified Optimization Opportunities:
{opportunities}
Please provide:
1. Top 5 prioritized cost optimization recommendations
2. Specific action items for each recommendation
3. Expected timeline and difficulty for implementation
4. Estimated cost savings for each recommendation
5. Any industry-specific best practices for {kind} organizations

Format your response as JSON with the following structure:
{{
  "summary": "Brief overview of optimization potential",
  "prioritizedRecommendations": [
    {{
      "title": "Recommendation title",
      "description": "Detailed description",
      "estimatedSavings": 1234.56,
      "timeToImplement": "2-4 weeks",
      "difficulty": "medium",
      "actionItems": ["Action 1", "Action 2"],
      "priority": "high"
    }}
  ],
  "totalEstimatedSavings": 5678.90,
  "implementationRoadmap": "Suggested order of implementation"
}}"#,
        kind = customer.customer_type,
        name = customer.name,
        region = customer.region,
        licenses = customer.licenses.join(", "),
        total = ctx.total_cost,
        compliance = compliance,
        usage = usage,
        score = benchmark.overall_efficiency_score * 100.0,
        percentile = benchmark.regional_percentile,
        services = services,
        opportunities = opportunities,
    )
}
