//! HTTP route modules

pub mod allocation;
pub mod calculate;
pub mod forecast;
pub mod health;

use actix_web::web;

/// Register every route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes).service(
        web::scope("/api")
            .configure(calculate::configure_routes)
            .configure(allocation::configure_routes)
            .configure(forecast::configure_routes),
    );
}
