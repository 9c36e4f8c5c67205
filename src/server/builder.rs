//! Server builder and run_server function
//!
//! `run_server` resolves configuration from the command line, `.env`, the
//! YAML file and `LABCOST_*` variables, in that order of discovery, then
//! starts the HTTP server.

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::server::server::HttpServer;
use crate::utils::error::{EstimatorError, Result};
use crate::utils::logging::init_tracing;
use clap::Parser;
use tracing::{info, warn};

/// Command line options
#[derive(Debug, Clone, Parser)]
#[command(name = "labcost-server", version, about = "Lab cloud cost estimation service")]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, env = "LABCOST_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
    /// Bind address, overriding the configuration file
    #[arg(long)]
    pub host: Option<String>,
    /// Port, overriding the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Server builder for easier configuration
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| EstimatorError::config("Configuration is required"))?;
        HttpServer::new(&config)
    }
}

/// Load the configuration file, falling back to defaults when it is missing
/// or invalid
pub async fn load_config(path: &str) -> Config {
    match Config::from_file(path).await {
        Ok(config) => {
            info!("Configuration file loaded successfully");
            config
        }
        Err(e) => {
            warn!(
                "Configuration file loading failed, using default config: {}",
                e
            );
            Config::default()
        }
    }
}

/// Apply command-line overrides on top of file and environment settings
pub fn apply_cli(mut config: Config, cli: &Cli) -> Result<Config> {
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;
    Ok(config)
}

/// Run the server with automatic configuration loading
pub async fn run_server() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let config = load_config(&cli.config).await;
    let config = apply_cli(config.apply_env_overrides()?, &cli)?;

    init_tracing(&config.logging);
    info!("Starting labcost {}", crate::VERSION);
    info!("Configuration file: {}", cli.config);

    let server = ServerBuilder::new().with_config(config.clone()).build()?;
    info!("Server starting at: http://{}", config.server.address());
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /api/calculate - Project pricing");
    info!("   POST /api/map-customer-region - Cost allocation and benchmarking");
    info!("   POST /api/forecast - Existing customer forecast");
    info!("   POST /api/forecast/new-customer - Prospective customer forecast");
    info!("   GET  /api/forecast/scenarios - Forecast scenarios");

    server.start().await
}
