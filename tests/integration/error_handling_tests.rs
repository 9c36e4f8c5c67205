//! Error handling integration tests
//!
//! Errors raised anywhere in the library surface to HTTP callers as
//! `{"error": "..."}` bodies with a status chosen by error kind.

#[cfg(test)]
mod tests {
    use crate::common::*;
    use actix_web::ResponseError;
    use actix_web::body::to_bytes;
    use actix_web::{test, web};
    use labcost::server::HttpServer;
    use labcost::utils::error::{ErrorResponse, EstimatorError};
    use serde_json::{Value, json};

    async fn rendered(error: EstimatorError) -> (u16, String) {
        let response = error.error_response();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        (status, body.error)
    }

    #[actix_web::test]
    async fn test_client_errors_keep_their_message() {
        let (status, message) =
            rendered(EstimatorError::validation("Missing required fields: customerName")).await;
        assert_eq!(status, 400);
        assert_eq!(message, "Missing required fields: customerName");

        let (status, message) = rendered(EstimatorError::parsing("Invalid base64 payload")).await;
        assert_eq!(status, 400);
        assert_eq!(message, "Invalid base64 payload");
    }

    #[actix_web::test]
    async fn test_server_side_errors() {
        let (status, message) = rendered(EstimatorError::regional_data(
            "Could not find total costs row in regional data",
        ))
        .await;
        assert_eq!(status, 500);
        assert_eq!(message, "Could not find total costs row in regional data");

        let (status, message) = rendered(EstimatorError::generation("model offline")).await;
        assert_eq!(status, 502);
        assert!(message.contains("model offline"));

        let (status, message) = rendered(EstimatorError::config("secret path /etc/x")).await;
        assert_eq!(status, 500);
        assert_eq!(message, "Internal server error");
    }

    #[::core::prelude::v1::test]
    fn test_serde_errors_convert() {
        let err = serde_json::from_str::<Value>("{").unwrap_err();
        let error: EstimatorError = err.into();
        assert!(matches!(error, EstimatorError::Serialization(_)));
        assert!(!error.is_client_error());
    }

    #[::core::prelude::v1::test]
    fn test_chain_report_names_the_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "tables.yaml");
        let error: EstimatorError = io.into();
        let report = error.chain_report();
        assert!(report.starts_with("Io("));
        assert!(report.contains("tables.yaml"));
    }

    #[actix_web::test]
    async fn test_malformed_json_body_is_rejected() {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let req = test::TestRequest::post()
            .uri("/api/calculate")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request body")
        );
    }

    #[actix_web::test]
    async fn test_pipeline_failure_body_carries_trace() {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let mut body = allocation_body(REGIONAL_WITHOUT_TOTAL_CSV, PRODUCTS_CSV, LOCAL_PEERS_CSV);
        body["additionalNotes"] = json!("none");
        let req = test::TestRequest::post()
            .uri("/api/map-customer-region")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 500);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["stack"].is_string());
        let steps = body["calculationSteps"].as_array().unwrap();
        assert_eq!(
            steps.last().and_then(Value::as_str),
            Some("API Error: Could not find total costs row in regional data")
        );
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let req = test::TestRequest::get().uri("/api/unknown").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
    }
}
