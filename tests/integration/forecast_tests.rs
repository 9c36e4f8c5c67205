//! Forecast endpoint tests

#[cfg(test)]
mod tests {
    use crate::assert_approx;
    use crate::common::test_state;
    use actix_web::{test, web};
    use labcost::server::HttpServer;
    use serde_json::{Value, json};

    async fn call(req: test::TestRequest) -> (u16, Value) {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status().as_u16();
        (status, test::read_body_json(resp).await)
    }

    async fn forecast(body: Value) -> (u16, Value) {
        call(test::TestRequest::post().uri("/api/forecast").set_json(body)).await
    }

    #[actix_web::test]
    async fn test_month_twelve_growth_factor_is_annual() {
        for (scenario, growth) in [("conservative", 0.08), ("moderate", 0.15), ("rapid", 0.40)] {
            let (status, body) = forecast(json!({
                "currentMonthlyCost": 2000.0,
                "scenario": scenario,
                "months": 24,
                "inflationRate": 0.0,
                "startYear": 2026
            }))
            .await;
            assert_eq!(status, 200);

            let points = body["points"].as_array().unwrap();
            assert_eq!(points.len(), 24);
            let scenario_body = &body["scenario"];
            let combined = (1.0 + growth)
                * scenario_body["usageMultiplier"].as_f64().unwrap()
                * scenario_body["complianceImpact"].as_f64().unwrap()
                * scenario_body["technologyAdoption"].as_f64().unwrap();
            assert_approx!(points[11]["growthFactor"].as_f64().unwrap(), combined);
            assert_eq!(points[11]["year"], 2026);
            assert_eq!(points[12]["year"], 2027);
        }
    }

    #[actix_web::test]
    async fn test_cumulative_cost_is_running_sum() {
        let (_, body) = forecast(json!({ "currentMonthlyCost": 1500.0, "months": 6 })).await;
        let points = body["points"].as_array().unwrap();
        let mut running = 0.0;
        for point in points {
            running += point["netCost"].as_f64().unwrap();
            assert_approx!(point["cumulativeCost"].as_f64().unwrap(), running);
        }
        assert_eq!(body["scenario"]["id"], "moderate");
        assert_approx!(body["summary"]["totalProjectedCost"].as_f64().unwrap(), running);
    }

    #[actix_web::test]
    async fn test_custom_scenario_rates() {
        let (status, body) = forecast(json!({
            "currentMonthlyCost": 1000.0,
            "scenario": "custom",
            "customScenario": {
                "growthRate": 0.5,
                "usageMultiplier": 1.0,
                "complianceImpact": 1.0,
                "technologyAdoption": 1.0
            },
            "months": 12,
            "inflationRate": 0.0
        }))
        .await;
        assert_eq!(status, 200);
        assert_approx!(body["summary"]["finalMonthlyCost"].as_f64().unwrap(), 1500.0);
    }

    #[actix_web::test]
    async fn test_invalid_horizon_and_scenario() {
        let (status, _) = forecast(json!({ "currentMonthlyCost": 1000.0, "months": 121 })).await;
        assert_eq!(status, 400);

        let (status, body) =
            forecast(json!({ "currentMonthlyCost": 1000.0, "scenario": "explosive" })).await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("explosive"));
    }

    #[actix_web::test]
    async fn test_new_customer_forecast() {
        let (status, body) = call(test::TestRequest::post().uri("/api/forecast/new-customer").set_json(json!({
            "customerName": "Prospect General",
            "customerType": "Clinic",
            "region": "US West (Oregon)",
            "sizeCategory": "Medium",
            "estimatedLabTypes": ["Core Lab", "Molecular Lab"],
            "dataVolume": "Medium",
            "complianceRequirements": [],
            "forecastPeriod": 12
        })))
        .await;

        assert_eq!(status, 200);
        assert_approx!(body["estimatedMonthlyCost"].as_f64().unwrap(), 6700.0);
        assert_eq!(body["points"].as_array().unwrap().len(), 12);
    }

    #[actix_web::test]
    async fn test_scenarios_listing() {
        let (status, body) = call(test::TestRequest::get().uri("/api/forecast/scenarios")).await;
        assert_eq!(status, 200);
        let ids: Vec<&str> = body["scenarios"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["conservative", "moderate", "aggressive", "rapid", "custom"]);
    }
}
