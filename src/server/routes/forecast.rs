//! Forecast endpoints

use crate::core::forecast::{ForecastProjector, ForecastRequest, ProspectRequest};
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde_json::json;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/forecast")
            .route("", web::post().to(existing_customer))
            .route("/new-customer", web::post().to(new_customer))
            .route("/scenarios", web::get().to(scenarios)),
    );
}

fn projector(state: &AppState) -> ForecastProjector<'_> {
    ForecastProjector::new(&state.tables, state.config.estimator.inflation_rate)
}

/// POST /api/forecast
pub async fn existing_customer(
    state: web::Data<AppState>,
    payload: web::Json<ForecastRequest>,
) -> Result<HttpResponse> {
    let forecast = projector(&state).existing_customer(&payload)?;
    Ok(HttpResponse::Ok().json(forecast))
}

/// POST /api/forecast/new-customer
pub async fn new_customer(
    state: web::Data<AppState>,
    payload: web::Json<ProspectRequest>,
) -> Result<HttpResponse> {
    let forecast = projector(&state).new_customer(&payload)?;
    Ok(HttpResponse::Ok().json(forecast))
}

/// GET /api/forecast/scenarios
pub async fn scenarios(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "scenarios": state.tables.forecast_scenarios }))
}
