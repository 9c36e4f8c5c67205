//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::pipeline::AllocationPipeline;
use crate::core::recommendations::{DisabledGenerator, OllamaGenerator, TextGenerator};
use crate::core::tables::ReferenceTables;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// HTTP server state shared across handlers
///
/// Everything is read-only after start-up and wrapped in `Arc`, so cloning
/// the state per worker is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<Config>,
    /// Reference tables used by every pipeline stage
    pub tables: Arc<ReferenceTables>,
    /// Text generator for region lookup and recommendations
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(
        config: Config,
        tables: ReferenceTables,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tables: Arc::new(tables),
            generator,
        }
    }

    /// Load tables and build the generator described by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let tables = ReferenceTables::load(config.estimator.tables_path.as_deref())?;

        let generator: Arc<dyn TextGenerator> = if config.llm.enabled {
            Arc::new(OllamaGenerator::new(&config.llm)?)
        } else {
            info!("Text generation disabled, fallbacks will be used");
            Arc::new(DisabledGenerator)
        };

        Ok(Self::new(config, tables, generator))
    }

    /// Allocation pipeline sharing this state's tables and generator
    pub fn pipeline(&self) -> AllocationPipeline {
        AllocationPipeline::new(
            self.tables.clone(),
            self.generator.clone(),
            self.config.estimator.default_region.clone(),
        )
        .with_benchmark_seed(self.config.estimator.benchmark_seed)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
