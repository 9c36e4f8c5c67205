//! Customer cost allocation endpoint

use crate::core::pipeline::AllocationRequest;
use crate::server::state::AppState;
use crate::utils::error::ErrorResponse;
use actix_web::{HttpResponse, web};
use tracing::{error, info};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/map-customer-region", web::post().to(map_customer_region));
}

/// POST /api/map-customer-region
///
/// Validation failures answer 400 with `{error}`. Any other failure answers
/// 500 with the error, its source chain and the calculation steps so far.
pub async fn map_customer_region(
    state: web::Data<AppState>,
    payload: web::Json<AllocationRequest>,
) -> HttpResponse {
    match state.pipeline().run(&payload).await {
        Ok(response) => {
            info!(
                customer = %response.customer_name,
                final_cost = response.key_metrics.final_cost,
                "Allocation served"
            );
            HttpResponse::Ok().json(response)
        }
        Err(failure) if failure.is_client_error() => {
            HttpResponse::BadRequest().json(ErrorResponse::new(failure.error.to_string()))
        }
        Err(failure) => {
            error!(error = %failure.error, "Allocation failed");
            HttpResponse::InternalServerError().json(failure.into_body())
        }
    }
}
