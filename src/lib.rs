//! # labcost
//!
//! Cloud cost estimation for healthcare lab customers.
//!
//! Given three uploaded spreadsheets (regional cost breakdown, product costs
//! and a customer list) plus a description of one customer, the service
//! estimates that customer's monthly cloud cost, benchmarks it against
//! regional peers, recommends optimisations and projects the cost forward
//! under growth scenarios.
//!
//! ## Features
//!
//! - **Allocation**: regional cost share from value-weighted peer groups
//! - **Consumption model**: per-lab, per-service cost with regional and questionnaire multipliers
//! - **Benchmarking**: percentile rank, efficiency score and lab cost positioning
//! - **Recommendations**: text-generation narrative with salvage and canned fallback
//! - **Forecasting**: monthly projections for existing and prospective customers
//!
//! ## Library use
//!
//! ```rust,no_run
//! use labcost::core::recommendations::DisabledGenerator;
//! use labcost::{AllocationPipeline, AllocationRequest, ReferenceTables};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = AllocationPipeline::new(
//!         Arc::new(ReferenceTables::builtin()?),
//!         Arc::new(DisabledGenerator),
//!         "US East (Ohio)",
//!     );
//!     let request: AllocationRequest = serde_json::from_str(&std::fs::read_to_string("request.json")?)?;
//!     match pipeline.run(&request).await {
//!         Ok(response) => println!("{}", response.highlighted_final_cost),
//!         Err(failure) => eprintln!("{}", failure.error),
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::Config;
pub use core::{
    AllocationPipeline, AllocationRequest, AllocationResponse, CalculationTrace, Customer,
    CustomerType, PipelineFailure, ReferenceTables,
};
pub use utils::error::{EstimatorError, Result};

use serde::Serialize;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub git_hash: &'static str,
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert!(!info.version.is_empty());
        assert_eq!(info.version, VERSION);
        assert!(!info.git_hash.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "labcost");
        assert_eq!(DESCRIPTION, env!("CARGO_PKG_DESCRIPTION"));
    }
}
