//! Application wiring tests: health, headers, CORS and a full wizard run

#[cfg(test)]
mod tests {
    use crate::common::*;
    use actix_web::{test, web};
    use futures::future::join_all;
    use labcost::core::forecast::{ForecastProjector, ForecastRequest};
    use labcost::core::session::{CustomerInfo, UploadedFiles, WizardSession};
    use labcost::server::HttpServer;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("labcost")
        );
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], labcost::VERSION);
        assert_eq!(body["llmEnabled"], false);
        assert!(body["build"]["version"].is_string());
    }

    #[actix_web::test]
    async fn test_cors_preflight() {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/calculate")
            .insert_header(("Origin", "http://localhost:3000"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[actix_web::test]
    async fn test_concurrent_quotes_are_independent() {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let requests = (1..=8u64).map(|users| {
            let req = test::TestRequest::post()
                .uri("/api/calculate")
                .set_json(json!({
                    "users": users,
                    "projectType": "Web Application",
                    "location": "US East (N. Virginia)"
                }))
                .to_request();
            test::call_and_read_body_json::<_, _, Value>(&app, req)
        });

        let bodies = join_all(requests).await;
        for (users, body) in (1..=8u64).zip(bodies) {
            assert_eq!(body["breakdown"]["numberOfUsers"], users);
        }
    }

    #[actix_web::test]
    async fn test_wizard_session_feeds_forecast() {
        let state = test_state();
        let mut session = WizardSession::new()
            .with_files(UploadedFiles {
                regional_cost_data: Some(b64(REGIONAL_CSV)),
                product_cost_data: Some(b64(PRODUCTS_CSV)),
                customer_list_data: Some(b64(DISTANT_PEERS_CSV)),
            })
            .with_customer(CustomerInfo {
                name: Some("Lakeside Clinic".to_string()),
                country: Some("USA".to_string()),
                city_state: Some("Arlington, VA".to_string()),
                licenses: vec!["Core Lab".to_string()],
                customer_type: Some("Clinic".to_string()),
                ..Default::default()
            });

        let request = session.calculation_request().unwrap();
        let response = state.pipeline().run(&request).await.unwrap();
        session.record_result(&response).unwrap();
        assert_eq!(session.forecast_base_cost(), response.key_metrics.final_cost);

        let stored = session.to_storage().unwrap();
        let restored = WizardSession::from_storage(&stored).unwrap();
        assert_eq!(restored.forecast_base_cost(), session.forecast_base_cost());

        let projector = ForecastProjector::new(&state.tables, 0.0);
        let forecast = projector
            .existing_customer(&ForecastRequest {
                current_monthly_cost: restored.forecast_base_cost(),
                months: Some(12),
                start_year: Some(2026),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(forecast.points.len(), 12);
        assert_eq!(forecast.scenario.id, "moderate");
    }
}
