//! Project pricing endpoint

use crate::core::pricing::{PricingRequest, quote};
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use tracing::debug;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/calculate", web::post().to(calculate));
}

/// POST /api/calculate
pub async fn calculate(
    state: web::Data<AppState>,
    payload: web::Json<PricingRequest>,
) -> Result<HttpResponse> {
    debug!(project_type = ?payload.project_type, location = ?payload.location, "Pricing requested");
    let quote = quote(&payload, &state.tables)?;
    Ok(HttpResponse::Ok().json(quote))
}
