//! Project pricing endpoint tests

#[cfg(test)]
mod tests {
    use crate::common::test_state;
    use actix_web::{test, web};
    use labcost::server::HttpServer;
    use serde_json::{Value, json};

    async fn post(body: Value) -> (u16, Value) {
        let app = test::init_service(HttpServer::create_app(web::Data::new(test_state()))).await;
        let req = test::TestRequest::post()
            .uri("/api/calculate")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn test_web_application_in_virginia() {
        let (status, body) = post(json!({
            "users": 100,
            "projectType": "Web Application",
            "location": "US East (N. Virginia)"
        }))
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["monthlyCost"], "100.00");
        assert_eq!(body["yearlyCost"], "1200.00");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["breakdown"]["numberOfUsers"], 100);
        assert_eq!(body["breakdown"]["costPerUser"], 0.5);
    }

    #[actix_web::test]
    async fn test_users_as_text() {
        let (status, body) = post(json!({
            "users": "10",
            "projectType": "Web Application",
            "location": "US West (Oregon)"
        }))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["monthlyCost"], "60.50");
    }

    #[actix_web::test]
    async fn test_missing_field_is_bad_request() {
        let (status, body) = post(json!({ "users": 5, "projectType": "Web Application" })).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[actix_web::test]
    async fn test_unknown_location_is_bad_request() {
        let (status, body) = post(json!({
            "users": 5,
            "projectType": "Web Application",
            "location": "Moon Base"
        }))
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Invalid project type or location");
    }

    #[actix_web::test]
    async fn test_negative_users_rejected() {
        let (status, body) = post(json!({
            "users": -3,
            "projectType": "Web Application",
            "location": "US East (N. Virginia)"
        }))
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Invalid number of users");
    }
}
