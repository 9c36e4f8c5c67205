//! Allocation pipeline against a mocked text-generation endpoint

#[cfg(test)]
mod tests {
    use crate::common::*;
    use labcost::config::LlmConfig;
    use labcost::core::recommendations::{OllamaGenerator, RecommendationSource};
    use labcost::{AllocationPipeline, AllocationRequest, ReferenceTables};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pipeline_for(server: &MockServer) -> AllocationPipeline {
        let config = LlmConfig {
            endpoint: format!("{}/api/generate", server.uri()),
            ..LlmConfig::default()
        };
        AllocationPipeline::new(
            Arc::new(ReferenceTables::builtin().unwrap()),
            Arc::new(OllamaGenerator::new(&config).unwrap()),
            TEST_REGION,
        )
        .with_benchmark_seed(Some(11))
    }

    fn request() -> AllocationRequest {
        serde_json::from_value(allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV))
            .unwrap()
    }

    async fn mount_reply(server: &MockServer, marker: &str, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": reply })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_generated_location_and_recommendations_are_used() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "geospatial",
            r#"Sure! {"customerLocation": "Frankfurt, Germany", "closestRegion": "Europe (Frankfurt)"}"#,
        )
        .await;
        mount_reply(
            &server,
            "cost optimization expert",
            r#"{"summary": "Trim compute", "prioritizedRecommendations": [
                {"title": "Spot", "description": "Move batch jobs to spot", "estimatedSavings": "$1,200"}
            ], "totalEstimatedSavings": 1200, "implementationRoadmap": "Q1"}"#,
        )
        .await;

        let response = pipeline_for(&server).run(&request()).await.unwrap();

        assert_eq!(response.closest_region, "Europe (Frankfurt)");
        assert_eq!(response.customer_location, "Frankfurt, Germany");
        // Frankfurt holds 1000 of the 2500 total, and the Virginia peers no longer group
        assert_eq!(response.key_metrics.specific_region_total_aws_cost, 1000.0);
        assert_eq!(response.key_metrics.customer_proportion_of_group, 1.0);

        let recommendations = &response.optimization_recommendations;
        assert_eq!(recommendations.source, RecommendationSource::Llm);
        assert_eq!(recommendations.prioritized_actions[0].estimated_savings, 1200.0);
        assert_eq!(recommendations.recommendations, vec!["Move batch jobs to spot".to_string()]);
    }

    #[tokio::test]
    async fn test_endpoint_failure_degrades_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let response = pipeline_for(&server).run(&request()).await.unwrap();

        assert_eq!(response.closest_region, TEST_REGION);
        assert_eq!(response.customer_location, "Arlington, VA");
        assert_eq!(
            response.optimization_recommendations.source,
            RecommendationSource::Fallback
        );
        assert!(response.calculation_steps.mentions("LLM Error for Step 1"));
        assert!(response.calculation_steps.mentions("Using fallback recommendations"));
    }

    #[tokio::test]
    async fn test_truncated_reply_is_salvaged() {
        let server = MockServer::start().await;
        mount_reply(&server, "geospatial", "The closest region is US East (N. Virginia).").await;
        mount_reply(
            &server,
            "cost optimization expert",
            r#"{"summary": "Partial", "prioritizedRecommendations": [{"title": "Tiering", "description": "Tier cold data", "estimatedSavings": 75"#,
        )
        .await;

        let response = pipeline_for(&server).run(&request()).await.unwrap();

        assert_eq!(response.closest_region, "US East (N. Virginia)");
        let recommendations = &response.optimization_recommendations;
        assert_eq!(recommendations.source, RecommendationSource::Salvaged);
        assert_eq!(recommendations.prioritized_actions[0].title, "Tiering");
        assert_eq!(recommendations.estimated_savings, 75.0);
    }
}
