//! Allocation endpoint and pipeline tests

#[cfg(test)]
mod tests {
    use crate::common::*;
    use crate::{assert_approx, assert_ok};
    use actix_web::{test, web};
    use labcost::core::allocation::group_proportions;
    use labcost::core::models::{Customer, CustomerType};
    use labcost::server::HttpServer;
    use serde_json::{Value, json};

    async fn post(body: Value) -> (u16, Value) {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let req = test::TestRequest::post()
            .uri("/api/map-customer-region")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        (status, test::read_body_json(resp).await)
    }

    fn steps(body: &Value) -> Vec<String> {
        serde_json::from_value(body["calculationSteps"].clone()).unwrap()
    }

    #[actix_web::test]
    async fn test_lone_clinic_takes_whole_region_cost() {
        let (status, body) =
            post(allocation_body(REGIONAL_CSV, PRODUCTS_CSV, DISTANT_PEERS_CSV)).await;

        assert_eq!(status, 200);
        assert_eq!(body["closestRegion"], TEST_REGION);
        assert_eq!(body["customerLocation"], "Arlington, VA");
        let metrics = &body["keyMetrics"];
        assert_eq!(metrics["reportingPeriod"], "2/1/2024");
        assert_eq!(metrics["specificRegionTotalAWSCost"], 1000.0);
        assert_approx!(metrics["regionalCostRatio"].as_f64().unwrap(), 0.4);
        assert_eq!(metrics["customerProportionOfGroup"], 1.0);
        assert_eq!(metrics["finalCost"], 1000.0);
        assert_eq!(body["highlightedFinalCost"], "$1,000.00");
        assert_eq!(body["allocation"]["inputCustomerValue"], 10000.0);
        assert_eq!(body["customerType"], "Clinic");
    }

    #[actix_web::test]
    async fn test_empty_product_table_costs_base_load_only() {
        let (status, body) =
            post(allocation_body(REGIONAL_CSV, EMPTY_PRODUCTS_CSV, DISTANT_PEERS_CSV)).await;

        assert_eq!(status, 200);
        // Core Lab base units for a Clinic in Virginia
        let expected = 8.0 + 90.0 + 3.5 + 600.0 + 50.0;
        assert_approx!(
            body["keyMetrics"]["inputCustomerTotalProductCost"].as_f64().unwrap(),
            expected
        );
        assert!(body["productMappings"].as_object().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_local_peers_share_region_cost() {
        let (status, body) =
            post(allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV)).await;

        assert_eq!(status, 200);
        // 10000 / (10000 + 105000 + 10000)
        assert_approx!(
            body["keyMetrics"]["customerProportionOfGroup"].as_f64().unwrap(),
            0.08
        );
        assert_approx!(body["keyMetrics"]["finalCost"].as_f64().unwrap(), 80.0);
        assert_eq!(body["allocation"]["members"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_missing_total_row_is_fatal() {
        let (status, body) = post(allocation_body(
            REGIONAL_WITHOUT_TOTAL_CSV,
            PRODUCTS_CSV,
            LOCAL_PEERS_CSV,
        ))
        .await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "Could not find total costs row in regional data");
        assert!(body["stack"].as_str().unwrap().contains("RegionalData"));
        let steps = steps(&body);
        assert_eq!(steps[0], "Request received.");
        assert!(steps.iter().any(|s| s.starts_with("Step 2: ")));
        assert!(steps.last().unwrap().starts_with("API Error:"));
    }

    #[actix_web::test]
    async fn test_unreadable_regional_payload_hits_fatal_path() {
        let mut body = allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV);
        body["regionalCostBreakdownData"] = json!("%%% not base64 %%%");
        let (status, body) = post(body).await;

        assert_eq!(status, 500);
        assert!(
            steps(&body)
                .iter()
                .any(|s| s.contains("Error parsing regional cost data"))
        );
    }

    #[actix_web::test]
    async fn test_malformed_customer_list_is_tolerated() {
        let mut body = allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV);
        body["customerListData"] = json!("%%%");
        let (status, body) = post(body).await;

        assert_eq!(status, 200);
        assert_eq!(body["keyMetrics"]["customerProportionOfGroup"], 1.0);
        assert!(
            steps(&body)
                .iter()
                .any(|s| s.contains("Proceeding with empty customer list"))
        );
    }

    #[actix_web::test]
    async fn test_required_fields() {
        let mut body = allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV);
        body.as_object_mut().unwrap().remove("productCostData");
        let (status, response) = post(body).await;
        assert_eq!(status, 400);
        assert!(
            response["error"]
                .as_str()
                .unwrap()
                .contains("Missing required fields")
        );

        let mut body = allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV);
        body["customerLicenses"] = json!("Core Lab");
        let (status, response) = post(body).await;
        assert_eq!(status, 400);
        assert!(response["error"].as_str().unwrap().contains("customerLicenses"));

        let mut body = allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV);
        body["customerLicenses"] = json!([""]);
        let (status, response) = post(body).await;
        assert_eq!(status, 400);
        assert!(response["error"].as_str().unwrap().contains("customerLicenses"));
    }

    #[actix_web::test]
    async fn test_lower_case_headers_are_recognised() {
        let regional = REGIONAL_CSV.replacen("Region", "region", 1);
        let products = PRODUCTS_CSV.replacen(
            "Product Name,Grand Total,AWS Cost",
            "product name,GRAND TOTAL,aws cost",
            1,
        );
        let (status, body) = post(allocation_body(&regional, &products, DISTANT_PEERS_CSV)).await;

        assert_eq!(status, 200);
        assert_eq!(body["keyMetrics"]["specificRegionTotalAWSCost"], 1000.0);
        assert_eq!(body["productMappings"]["Sequencer"], "Molecular Lab");
        assert_eq!(body["productMappings"]["Centrifuge"], "Core Lab");
    }

    #[actix_web::test]
    async fn test_benchmark_and_recommendations_are_present() {
        let (_, body) = post(allocation_body(REGIONAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV)).await;

        let benchmark = &body["benchmarkAnalysis"];
        let score = benchmark["overallEfficiencyScore"].as_f64().unwrap();
        let percentile = benchmark["regionalPercentile"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!((0.0..=100.0).contains(&percentile));

        let recommendations = &body["optimizationRecommendations"];
        assert_eq!(recommendations["source"], "fallback");
        assert_eq!(
            recommendations["prioritizedActions"].as_array().unwrap().len(),
            3
        );
        assert_eq!(
            body["message"],
            "Enhanced cost calculation with optimization recommendations completed successfully."
        );
    }

    #[actix_web::test]
    async fn test_hospital_beds_feed_value() {
        let mut body = allocation_body(REGIONAL_CSV, PRODUCTS_CSV, DISTANT_PEERS_CSV);
        body["customerType"] = json!("Hospital");
        body["customerBeds"] = json!("250");
        let (status, body) = post(body).await;
        assert_eq!(status, 200);
        assert_eq!(body["allocation"]["inputCustomerValue"], 255000.0);
    }

    #[::core::prelude::v1::test]
    fn test_group_proportions_sum_to_one() {
        let groups: Vec<Vec<Customer>> = vec![
            vec![
                Customer::new("a", TEST_REGION, vec!["Core Lab".into()])
                    .with_type(CustomerType::Hospital)
                    .with_beds(320),
                Customer::new("b", TEST_REGION, vec!["Core Lab".into()])
                    .with_type(CustomerType::ReferenceLab)
                    .with_product_count(44),
                Customer::new("c", TEST_REGION, vec!["Core Lab".into(), "Molecular Lab".into()]),
            ],
            vec![Customer::new("solo", TEST_REGION, vec!["Core Lab".into()])
                .with_type(CustomerType::Research)],
        ];

        for group in &groups {
            let total: f64 = group_proportions(group).iter().sum();
            assert_approx!(total, 1.0);
        }
    }

    #[tokio::test]
    async fn test_pipeline_runs_without_http() {
        let state = test_state();
        let request = assert_ok!(serde_json::from_value(allocation_body(
            REGIONAL_CSV,
            PRODUCTS_CSV,
            LOCAL_PEERS_CSV
        )));
        let response = state.pipeline().run(&request).await.unwrap();
        assert!(response.service_breakdown.contains_key("EC2"));
        assert_eq!(
            response.product_mappings.get("Sequencer").map(String::as_str),
            Some("Molecular Lab")
        );
        assert_eq!(
            response.product_mappings.get("Centrifuge").map(String::as_str),
            Some("Core Lab")
        );
    }
}
