//! Actix application assembly and the listener loop

use crate::config::{Config, CorsConfig, ServerConfig};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{EstimatorError, ErrorResponse, Result};
use actix_cors::Cors;
use actix_web::http::Method;
use actix_web::http::header::HeaderName;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer as ActixHttpServer, web};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// Listener settings plus the state shared by every worker
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Load tables and the text generator for `config`
    pub fn new(config: &Config) -> Result<Self> {
        info!("Building application state");
        let state = AppState::from_config(config.clone())?;
        Ok(Self::with_state(state))
    }

    /// Create a server around already-built state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.server.clone(),
            state,
        }
    }

    /// CORS middleware from configuration; unparseable methods and headers
    /// are skipped
    pub fn cors(cors_config: &CorsConfig) -> Cors {
        if !cors_config.enabled {
            return Cors::default();
        }

        let cors = if cors_config.allows_all_origins() {
            Cors::default().allow_any_origin()
        } else {
            cors_config
                .allowed_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        };

        let methods = cors_config
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse::<Method>().ok())
            .collect::<Vec<_>>();
        let headers = cors_config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse::<HeaderName>().ok())
            .collect::<Vec<_>>();

        let cors = if methods.is_empty() { cors } else { cors.allowed_methods(methods) };
        let cors = if headers.is_empty() { cors } else { cors.allowed_headers(headers) };
        cors.max_age(cors_config.max_age as usize)
    }

    /// JSON extractor settings; malformed bodies get the standard error shape
    pub fn json_config(max_body_size: usize) -> web::JsonConfig {
        web::JsonConfig::default()
            .limit(max_body_size)
            .error_handler(|err, _req| {
                let message = format!("Invalid request body: {}", err);
                let response = HttpResponse::BadRequest().json(ErrorResponse::new(message));
                actix_web::error::InternalError::from_response(err, response).into()
            })
    }

    /// Application with middleware and every route mounted on `state`
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let server_config = &state.config.server;
        let cors = Self::cors(&server_config.cors);
        let json_config = Self::json_config(server_config.max_body_size);

        App::new()
            .app_data(state)
            .app_data(json_config)
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "labcost")))
            .configure(routes::configure_routes)
    }

    /// Bind and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        info!(address = %bind_addr, "Binding HTTP listener");

        let state = web::Data::new(self.state);
        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            .run();

        info!(address = %bind_addr, "labcost is accepting requests");
        server
            .await
            .map_err(|e| EstimatorError::server(format!("Server error: {}", e)))?;

        info!("HTTP listener shut down");
        Ok(())
    }

    fn format_bind_error(e: std::io::Error, bind_addr: &str) -> EstimatorError {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            warn!(address = bind_addr, "Address already in use");
            EstimatorError::server(format!(
                "Failed to bind to {}: address already in use. Stop the other process or set LABCOST_PORT.",
                bind_addr
            ))
        } else {
            EstimatorError::server(format!("Failed to bind to {}: {}", bind_addr, e))
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
